use url::Url;

use crate::formats::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CoverSize {
    Mini,
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone)]
pub struct CoverSizes {
    pub mini: &'static str,
    pub small: &'static str,
    pub medium: &'static str,
    pub large: &'static str,
}

impl CoverSizes {
    pub fn token(&self, size: CoverSize) -> &'static str {
        match size {
            CoverSize::Mini => self.mini,
            CoverSize::Small => self.small,
            CoverSize::Medium => self.medium,
            CoverSize::Large => self.large,
        }
    }

    fn size_of(&self, segment: &str) -> Option<CoverSize> {
        [
            CoverSize::Mini,
            CoverSize::Small,
            CoverSize::Medium,
            CoverSize::Large,
        ]
        .into_iter()
        .find(|size| self.token(*size) == segment)
    }

    /// Upgrades the size segment of a cover URL to `size`. Covers already at
    /// `size` or larger, and URLs without a known size segment, come back
    /// unchanged.
    pub fn resolve(&self, cover_url: &str, size: CoverSize) -> String {
        let mut segments = cover_url.split('/').collect::<Vec<_>>();
        let found = segments
            .iter()
            .enumerate()
            .find_map(|(index, segment)| self.size_of(segment).map(|current| (index, current)));
        if let Some((index, _)) = found.filter(|(_, current)| *current < size) {
            segments[index] = self.token(size);
        }
        segments.join("/")
    }
}

#[derive(Debug, Clone)]
pub struct MarketplaceProfile {
    pub host_suffix: &'static str,
    pub cart_path: &'static str,
    pub selection_control: &'static str,
    pub row_tag: &'static str,
    pub row_id_prefix: &'static str,
    pub item_id_attr: &'static str,
    pub price_attr: &'static str,
    pub quantity_attr: &'static str,
    pub title: &'static str,
    pub cover: &'static str,
    pub condition_prefix: &'static str,
    pub product_url_base: &'static str,
    pub cover_sizes: CoverSizes,
    pub cover_size: CoverSize,
}

impl MarketplaceProfile {
    pub fn aladin() -> Self {
        Self {
            host_suffix: "aladin.co.kr",
            cart_path: "/shop/wbasket.aspx",
            selection_control: "input.ShopCode_Basket_Check.basket_CheckBox",
            row_tag: "tr",
            row_id_prefix: "CartTr_",
            item_id_attr: "itemid",
            price_attr: "pricesales",
            quantity_attr: "qty",
            title: "span.basket_tit a",
            cover: r#"img[src*="aladin.co.kr/product"]"#,
            condition_prefix: "중고",
            product_url_base: "https://www.aladin.co.kr/shop/wproduct.aspx",
            cover_sizes: CoverSizes {
                mini: "covermini",
                small: "coversum",
                medium: "cover200",
                large: "cover500",
            },
            cover_size: CoverSize::Small,
        }
    }

    pub fn product_url(&self, item_id: ItemId) -> String {
        format!("{}?ItemId={item_id}", self.product_url_base)
    }

    pub fn is_marketplace_host(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        host == self.host_suffix || host.ends_with(&format!(".{}", self.host_suffix))
    }

    pub fn is_cart_page(&self, url: &Url) -> bool {
        self.is_marketplace_host(url) && url.path().eq_ignore_ascii_case(self.cart_path)
    }
}

impl Default for MarketplaceProfile {
    fn default() -> Self {
        Self::aladin()
    }
}
