use crate::error::BundleError;
use crate::formats::BundleRequest;
use crate::selection::SelectionStore;

pub const MIN_BUNDLE_BOOKS: usize = 2;

impl BundleRequest {
    pub fn from_selection(store: &SelectionStore) -> Result<Self, BundleError> {
        if store.len() < MIN_BUNDLE_BOOKS {
            return Err(BundleError::TooFewBooks { count: store.len() });
        }
        Ok(Self {
            books: store.list().to_vec(),
        })
    }
}
