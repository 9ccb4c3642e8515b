use std::path::Path;

use anyhow::Context as _;
use url::Url;

use crate::cli::{CheckArgs, SendArgs};
use crate::config::AppConfig;
use crate::error::BundleError;
use crate::extract::CartExtractor;
use crate::formats::BookRecord;
use crate::marketplace::MarketplaceProfile;
use crate::page::{CartPage, HtmlCartPage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Cart,
    Marketplace,
    Foreign,
}

impl PageKind {
    pub fn classify(profile: &MarketplaceProfile, tab_url: &str) -> Self {
        let Ok(url) = Url::parse(tab_url) else {
            return PageKind::Foreign;
        };
        if profile.is_cart_page(&url) {
            PageKind::Cart
        } else if profile.is_marketplace_host(&url) {
            PageKind::Marketplace
        } else {
            PageKind::Foreign
        }
    }

    pub fn guidance(self) -> &'static str {
        match self {
            PageKind::Cart => "this is the marketplace cart page",
            PageKind::Marketplace => "open the marketplace cart page to extract books",
            PageKind::Foreign => "this is not a marketplace page",
        }
    }
}

/// Proof that an action was started by the shopper. Cross-context
/// extraction only runs with one in hand.
#[derive(Debug)]
pub struct UserGesture {
    _private: (),
}

impl UserGesture {
    pub fn click() -> Self {
        Self { _private: () }
    }
}

pub trait CartCapability {
    fn extract(&self, page: &dyn CartPage) -> Vec<BookRecord>;
}

impl CartCapability for CartExtractor {
    fn extract(&self, page: &dyn CartPage) -> Vec<BookRecord> {
        CartExtractor::extract(self, page)
    }
}

pub struct ScriptHost {
    profile: MarketplaceProfile,
    capability: Box<dyn CartCapability>,
}

impl ScriptHost {
    pub fn new(profile: MarketplaceProfile, capability: Box<dyn CartCapability>) -> Self {
        Self {
            profile,
            capability,
        }
    }

    pub fn for_profile(profile: MarketplaceProfile) -> anyhow::Result<Self> {
        let extractor = CartExtractor::new(profile.clone())?;
        Ok(Self::new(profile, Box::new(extractor)))
    }

    pub fn check(&self, tab_url: &str) -> Result<(), BundleError> {
        match PageKind::classify(&self.profile, tab_url) {
            PageKind::Cart => Ok(()),
            other => Err(BundleError::NotOnTargetPage(other)),
        }
    }

    pub fn invoke(
        &self,
        _gesture: &UserGesture,
        tab_url: &str,
        page: &dyn CartPage,
    ) -> Result<Vec<BookRecord>, BundleError> {
        self.check(tab_url)?;
        let records = self.capability.extract(page);
        if records.is_empty() {
            return Err(BundleError::ExtractionEmpty);
        }
        tracing::info!(count = records.len(), "extracted cart books");
        Ok(records)
    }
}

fn default_cart_url(profile: &MarketplaceProfile) -> String {
    format!("https://www.{}{}", profile.host_suffix, profile.cart_path)
}

/// Extracts from a saved cart page. Without a tab URL the page is taken to
/// be the cart.
pub fn extract_from_file(
    profile: &MarketplaceProfile,
    page_path: &str,
    tab_url: Option<&str>,
) -> anyhow::Result<Vec<BookRecord>> {
    let path = Path::new(page_path);
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("read cart page: {}", path.display()))?;
    let page = HtmlCartPage::parse(&html, profile)?;

    let host = ScriptHost::for_profile(profile.clone())?;
    let tab_url = tab_url.map_or_else(|| default_cart_url(profile), str::to_owned);
    let records = host.invoke(&UserGesture::click(), &tab_url, &page)?;
    Ok(records)
}

pub fn check(args: CheckArgs) -> anyhow::Result<()> {
    let kind = PageKind::classify(&MarketplaceProfile::aladin(), &args.tab_url);
    println!("{}", kind.guidance());
    if kind != PageKind::Cart {
        return Err(BundleError::NotOnTargetPage(kind).into());
    }
    Ok(())
}

pub fn send(args: SendArgs) -> anyhow::Result<()> {
    let config = AppConfig::from_env()
        .context("load config")?
        .with_overrides(args.app_url.as_deref(), None)?;
    let profile = MarketplaceProfile::aladin();

    let records = extract_from_file(&profile, &args.page, args.tab_url.as_deref())?;
    let url = crate::handoff::handoff_url(&config.app_url, &records).context("build handoff url")?;
    tracing::info!(count = records.len(), app = %config.app_url, "handing off to web app");
    println!("{url}");
    Ok(())
}
