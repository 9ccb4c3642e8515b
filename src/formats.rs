use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub type ItemId = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Condition {
    Fair,
    #[default]
    Good,
    Best,
}

impl Condition {
    pub fn label(self) -> &'static str {
        match self {
            Condition::Best => "최상",
            Condition::Good => "상",
            Condition::Fair => "중",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw {
            "최상" => return Some(Condition::Best),
            "상" => return Some(Condition::Good),
            "중" => return Some(Condition::Fair),
            _ => {}
        }
        match raw.to_ascii_lowercase().as_str() {
            "best" => Some(Condition::Best),
            "good" => Some(Condition::Good),
            "fair" => Some(Condition::Fair),
            _ => None,
        }
    }

    pub fn is_at_least(self, min: Condition) -> bool {
        self >= min
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Condition {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::from_label(s).ok_or_else(|| {
            anyhow::anyhow!("unknown condition: {s:?}. expected one of: best, good, fair")
        })
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Condition::from_label(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown condition: {raw:?}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub item_id: ItemId,
    pub title: String,
    pub condition: Condition,
    pub unit_price: u64,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    pub product_url: String,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedBook {
    pub item_id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn13: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, rename = "cover", skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, rename = "priceStandard", skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<u64>,
    #[serde(skip, default = "default_quantity")]
    pub quantity: u32,
    #[serde(skip)]
    pub captured_condition: Option<Condition>,
    #[serde(skip)]
    pub product_url: Option<String>,
    #[serde(rename = "minQuality", default)]
    pub min_condition: Condition,
}

impl SelectedBook {
    pub fn from_record(record: BookRecord, min_condition: Condition) -> Self {
        Self {
            item_id: record.item_id,
            isbn13: None,
            title: record.title,
            author: None,
            cover_url: record.cover_url,
            unit_price: Some(record.unit_price),
            quantity: record.quantity,
            captured_condition: Some(record.condition),
            product_url: Some(record.product_url),
            min_condition,
        }
    }

    pub fn from_search(result: &SearchResult) -> Self {
        Self {
            item_id: result.item_id,
            isbn13: result.isbn13.clone(),
            title: result.title.clone(),
            author: result.author.clone(),
            cover_url: result.cover.clone(),
            unit_price: result.price_standard,
            quantity: 1,
            captured_condition: None,
            product_url: None,
            min_condition: Condition::Fair,
        }
    }
}

impl From<BookRecord> for SelectedBook {
    fn from(record: BookRecord) -> Self {
        let condition = record.condition;
        SelectedBook::from_record(record, condition)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub item_id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn13: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_standard: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_sales: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_min_price: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleRequest {
    pub books: Vec<SelectedBook>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleResult {
    #[serde(default)]
    pub requested_books: Vec<SelectedBook>,
    #[serde(default)]
    pub total_requested_count: u32,
    #[serde(default)]
    pub sellers: Vec<SellerInfo>,
    #[serde(default)]
    pub has_complete_seller: bool,
    #[serde(default)]
    pub analysis_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerInfo {
    pub seller_code: String,
    pub seller_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfaction_rate: Option<f64>,
    #[serde(default)]
    pub shop_url: String,
    #[serde(default)]
    pub books: Vec<SellerBook>,
    #[serde(default)]
    pub total_book_count: u32,
    #[serde(default)]
    pub total_price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_fee: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_shipping_threshold: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerBook {
    pub item_id: ItemId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,
}
