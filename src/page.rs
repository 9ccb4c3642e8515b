use anyhow::Context as _;
use scraper::{ElementRef, Html, Selector};

use crate::marketplace::MarketplaceProfile;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCartRow {
    pub item_id: Option<String>,
    pub price: Option<String>,
    pub quantity: Option<String>,
    pub title: Option<String>,
    pub cover_src: Option<String>,
}

pub trait CartPage {
    fn rows(&self) -> Vec<RawCartRow>;
}

impl CartPage for [RawCartRow] {
    fn rows(&self) -> Vec<RawCartRow> {
        self.to_vec()
    }
}

impl CartPage for Vec<RawCartRow> {
    fn rows(&self) -> Vec<RawCartRow> {
        self.clone()
    }
}

struct CartSelectors {
    control: Selector,
    title: Selector,
    cover: Selector,
}

fn selector(raw: &str) -> anyhow::Result<Selector> {
    Selector::parse(raw).map_err(|err| anyhow::anyhow!("parse selector {raw:?}: {err}"))
}

pub struct HtmlCartPage {
    document: Html,
    selectors: CartSelectors,
    profile: MarketplaceProfile,
}

impl HtmlCartPage {
    pub fn parse(html: &str, profile: &MarketplaceProfile) -> anyhow::Result<Self> {
        let selectors = CartSelectors {
            control: selector(profile.selection_control).context("selection control selector")?,
            title: selector(profile.title).context("title selector")?,
            cover: selector(profile.cover).context("cover selector")?,
        };
        Ok(Self {
            document: Html::parse_document(html),
            selectors,
            profile: profile.clone(),
        })
    }

    fn enclosing_row<'a>(&self, control: ElementRef<'a>) -> Option<ElementRef<'a>> {
        control.ancestors().filter_map(ElementRef::wrap).find(|el| {
            el.value().name() == self.profile.row_tag
                && el
                    .value()
                    .id()
                    .is_some_and(|id| id.starts_with(self.profile.row_id_prefix))
        })
    }
}

impl CartPage for HtmlCartPage {
    fn rows(&self) -> Vec<RawCartRow> {
        let mut rows = Vec::new();
        for control in self.document.select(&self.selectors.control) {
            let Some(row) = self.enclosing_row(control) else {
                tracing::debug!("selection control outside a cart row; skipping");
                continue;
            };

            let attr = |name: &str| control.value().attr(name).map(str::to_owned);
            let title = row
                .select(&self.selectors.title)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_owned());
            let cover_src = row
                .select(&self.selectors.cover)
                .next()
                .and_then(|el| el.value().attr("src"))
                .map(str::to_owned);

            rows.push(RawCartRow {
                item_id: attr(self.profile.item_id_attr),
                price: attr(self.profile.price_attr),
                quantity: attr(self.profile.quantity_attr),
                title,
                cover_src,
            });
        }
        rows
    }
}
