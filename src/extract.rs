use std::io::Write as _;

use anyhow::Context as _;
use regex::Regex;

use crate::cli::ExtractArgs;
use crate::formats::{BookRecord, Condition, ItemId};
use crate::marketplace::MarketplaceProfile;
use crate::page::{CartPage, HtmlCartPage, RawCartRow};

pub fn run(args: ExtractArgs) -> anyhow::Result<()> {
    let profile = MarketplaceProfile::aladin();
    let records = crate::extension::extract_from_file(&profile, &args.page, args.tab_url.as_deref())?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &records).context("write records json")?;
    stdout.write_all(b"\n").context("write records newline")?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct CartExtractor {
    profile: MarketplaceProfile,
    condition_tag: Regex,
}

impl CartExtractor {
    pub fn new(profile: MarketplaceProfile) -> anyhow::Result<Self> {
        let pattern = format!(r"\[{}-([^\]]+)\]\s*", regex::escape(profile.condition_prefix));
        let condition_tag = Regex::new(&pattern).context("compile condition tag pattern")?;
        Ok(Self {
            profile,
            condition_tag,
        })
    }

    pub fn profile(&self) -> &MarketplaceProfile {
        &self.profile
    }

    pub fn extract(&self, page: &(impl CartPage + ?Sized)) -> Vec<BookRecord> {
        let mut records = Vec::new();
        for (index, row) in page.rows().into_iter().enumerate() {
            match self.record_from_row(row) {
                Some(record) => records.push(record),
                None => tracing::debug!(row = index, "cart row without item id; skipping"),
            }
        }
        records
    }

    pub fn extract_html(&self, html: &str) -> anyhow::Result<Vec<BookRecord>> {
        let page = HtmlCartPage::parse(html, &self.profile).context("parse cart page")?;
        Ok(self.extract(&page))
    }

    fn record_from_row(&self, row: RawCartRow) -> Option<BookRecord> {
        let item_id = parse_item_id(row.item_id.as_deref()?)?;
        let unit_price = row
            .price
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0);
        let quantity = row
            .quantity
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|qty| *qty > 0)
            .unwrap_or(1);

        let full_title = row.title.unwrap_or_default();
        let (title, condition) = self.split_condition(full_title.trim());

        let cover_url = row
            .cover_src
            .map(|src| src.trim().to_owned())
            .filter(|src| !src.is_empty())
            .map(|src| self.profile.cover_sizes.resolve(&src, self.profile.cover_size));

        Some(BookRecord {
            item_id,
            title,
            condition,
            unit_price,
            quantity,
            cover_url,
            product_url: self.profile.product_url(item_id),
        })
    }

    pub fn split_condition(&self, full_title: &str) -> (String, Condition) {
        let Some(captures) = self.condition_tag.captures(full_title) else {
            return (full_title.to_owned(), Condition::Good);
        };
        let tag = captures.get(1).map_or("", |m| m.as_str());
        let condition = Condition::from_label(tag).unwrap_or_else(|| {
            tracing::debug!(tag, "unrecognized condition tag; treating as fair");
            Condition::Fair
        });
        let title = self.condition_tag.replacen(full_title, 1, "").trim().to_owned();
        (title, condition)
    }
}

fn parse_item_id(raw: &str) -> Option<ItemId> {
    raw.trim().parse::<ItemId>().ok().filter(|id| *id > 0)
}
