//! Handoff token carried in the web app URL fragment.
//!
//! Wire form: JSON array of extension records, percent-encoded with
//! `encodeURIComponent` semantics, then base64 (standard alphabet).

use base64::Engine as _;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::formats::{BookRecord, Condition, ItemId, SelectedBook};

pub const MARKER_KEY: &str = "from";
pub const MARKER_VALUE: &str = "extension";
pub const FRAGMENT_KEY: &str = "data=";

const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("fragment carries no handoff token")]
    MissingToken,
    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token payload has a malformed percent escape at byte {0}")]
    MalformedEscape(usize),
    #[error("token payload is not percent-encoded utf-8: {0}")]
    PercentDecoding(#[from] std::str::Utf8Error),
    #[error("token payload is not a book list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("token carries no books")]
    Empty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBook {
    item_id: ItemId,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quality: Option<String>,
    #[serde(default)]
    price: Option<u64>,
    #[serde(default)]
    qty: Option<u32>,
    #[serde(default)]
    cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    product_url: Option<String>,
}

impl From<&BookRecord> for WireBook {
    fn from(record: &BookRecord) -> Self {
        let label = record.condition.label().to_owned();
        Self {
            item_id: record.item_id,
            title: record.title.clone(),
            quality: Some(label.clone()),
            price: Some(record.unit_price),
            qty: Some(record.quantity),
            cover: Some(record.cover_url.clone().unwrap_or_default()),
            min_quality: Some(label),
            product_url: Some(record.product_url.clone()),
        }
    }
}

impl WireBook {
    fn resolved_condition(&self) -> Condition {
        [self.min_quality.as_deref(), self.quality.as_deref()]
            .into_iter()
            .flatten()
            .find_map(Condition::from_label)
            .unwrap_or_default()
    }

    fn into_selected(self) -> SelectedBook {
        let condition = self.resolved_condition();
        SelectedBook {
            item_id: self.item_id,
            isbn13: None,
            title: self.title,
            author: None,
            cover_url: self.cover.filter(|cover| !cover.is_empty()),
            unit_price: Some(self.price.unwrap_or_default()),
            quantity: self.qty.unwrap_or_default().max(1),
            captured_condition: self.quality.as_deref().and_then(Condition::from_label),
            product_url: self.product_url,
            min_condition: condition,
        }
    }
}

pub fn encode(records: &[BookRecord]) -> anyhow::Result<String> {
    let wire = records.iter().map(WireBook::from).collect::<Vec<_>>();
    let json = serde_json::to_string(&wire)?;
    let escaped = utf8_percent_encode(&json, URI_COMPONENT).to_string();
    Ok(base64::engine::general_purpose::STANDARD.encode(escaped))
}

// Every `%` must start a two-digit hex escape.
fn check_escapes(escaped: &str) -> Result<(), DecodeError> {
    let bytes = escaped.as_bytes();
    for (index, _) in bytes.iter().enumerate().filter(|(_, b)| **b == b'%') {
        let hex = bytes.get(index + 1..index + 3);
        if !hex.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
            return Err(DecodeError::MalformedEscape(index));
        }
    }
    Ok(())
}

pub fn decode(token: &str) -> Result<Vec<SelectedBook>, DecodeError> {
    let bytes = TOKEN_ENGINE.decode(token.trim())?;
    let escaped = std::str::from_utf8(&bytes)?;
    check_escapes(escaped)?;
    let json = percent_decode_str(escaped).decode_utf8()?;
    let wire: Vec<WireBook> = serde_json::from_str(&json)?;
    if wire.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(wire.into_iter().map(WireBook::into_selected).collect())
}

pub fn handoff_url(app_url: &Url, records: &[BookRecord]) -> anyhow::Result<Url> {
    let token = encode(records)?;
    let mut url = app_url.clone();
    url.query_pairs_mut().append_pair(MARKER_KEY, MARKER_VALUE);
    url.set_fragment(Some(&format!("{FRAGMENT_KEY}{token}")));
    Ok(url)
}

pub fn has_marker(location: &Url) -> bool {
    location
        .query_pairs()
        .any(|(key, value)| key == MARKER_KEY && value == MARKER_VALUE)
}

fn token_from_fragment(fragment: &str) -> Option<&str> {
    let start = fragment.find(FRAGMENT_KEY)? + FRAGMENT_KEY.len();
    let token = fragment[start..].split('&').next().unwrap_or_default();
    (!token.is_empty()).then_some(token)
}

pub fn decode_location(location: &Url) -> Result<Vec<SelectedBook>, DecodeError> {
    let fragment = location.fragment().ok_or(DecodeError::MissingToken)?;
    let token = token_from_fragment(fragment).ok_or(DecodeError::MissingToken)?;
    decode(token)
}

pub fn clean_location(location: &Url) -> Url {
    let mut cleaned = location.clone();
    cleaned.set_fragment(None);
    let kept = location
        .query_pairs()
        .filter(|(key, value)| !(key == MARKER_KEY && value == MARKER_VALUE))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect::<Vec<_>>();
    if kept.is_empty() {
        cleaned.set_query(None);
    } else {
        cleaned.query_pairs_mut().clear().extend_pairs(kept);
    }
    cleaned
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub books: Vec<SelectedBook>,
    pub cleaned_location: Url,
}

/// Reads a handoff from the location the web app was opened at. Any
/// failure reads as "nothing to import".
pub fn import_from_location(location: &Url) -> Option<Import> {
    if !has_marker(location) {
        return None;
    }
    match decode_location(location) {
        Ok(books) => Some(Import {
            books,
            cleaned_location: clean_location(location),
        }),
        Err(err) => {
            tracing::debug!(%err, "ignoring handoff token");
            None
        }
    }
}
