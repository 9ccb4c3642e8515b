use crate::bundle::MIN_BUNDLE_BOOKS;
use crate::extension::PageKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BundleError {
    #[error("{}", .0.guidance())]
    NotOnTargetPage(PageKind),
    #[error("no books found in the cart; check the items to bundle and try again")]
    ExtractionEmpty,
    #[error("book search failed: {0}")]
    SearchFailed(String),
    #[error("bundle analysis failed: {0}")]
    AnalysisFailed(String),
    #[error("bundle analysis needs at least {min} books (have {count})", min = MIN_BUNDLE_BOOKS)]
    TooFewBooks { count: usize },
}
