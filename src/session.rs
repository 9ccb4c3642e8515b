use std::io::Write as _;

use anyhow::Context as _;
use serde::Serialize;
use url::Url;

use crate::api::{BookApi, HttpBookApi};
use crate::cli::{AnalyzeArgs, HealthArgs, ImportArgs, SearchArgs};
use crate::config::AppConfig;
use crate::error::BundleError;
use crate::formats::{BundleRequest, BundleResult, ItemId, SearchResult, SelectedBook};
use crate::generation::{Latest, Ticket};
use crate::handoff::import_from_location;
use crate::selection::SelectionStore;

#[derive(Debug, Default)]
pub struct Session {
    pub selection: SelectionStore,
    imported: Option<usize>,
    search_notice: Option<BundleError>,
    analysis_notice: Option<BundleError>,
    search: Latest<Vec<SearchResult>>,
    analysis: Latest<BundleResult>,
}

#[derive(Debug)]
pub struct Loaded {
    pub session: Session,
    pub replace_location: Option<Url>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(location: &Url) -> Loaded {
        let mut session = Session::new();
        let Some(import) = import_from_location(location) else {
            return Loaded {
                session,
                replace_location: None,
            };
        };

        session.selection = SelectionStore::from_books(import.books);
        session.imported = Some(session.selection.len());
        tracing::info!(count = session.selection.len(), "imported books from extension");
        Loaded {
            session,
            replace_location: Some(import.cleaned_location),
        }
    }

    pub fn import_banner(&self) -> Option<usize> {
        self.imported
    }

    pub fn dismiss_import_banner(&mut self) {
        self.imported = None;
    }

    pub fn search_notice(&self) -> Option<&BundleError> {
        self.search_notice.as_ref()
    }

    pub fn dismiss_search_notice(&mut self) {
        self.search_notice = None;
    }

    pub fn analysis_notice(&self) -> Option<&BundleError> {
        self.analysis_notice.as_ref()
    }

    pub fn dismiss_analysis_notice(&mut self) {
        self.analysis_notice = None;
    }

    pub fn search_results(&self) -> Option<&[SearchResult]> {
        self.search.get().map(Vec::as_slice)
    }

    pub fn bundle_result(&self) -> Option<&BundleResult> {
        self.analysis.get()
    }

    pub fn close_result(&mut self) {
        self.analysis.clear();
    }

    pub fn begin_search(&mut self, keyword: &str) -> Option<Ticket> {
        if keyword.trim().is_empty() {
            return None;
        }
        self.search_notice = None;
        Some(self.search.issue())
    }

    pub fn finish_search(
        &mut self,
        ticket: Ticket,
        outcome: Result<Vec<SearchResult>, BundleError>,
    ) {
        if !self.search.is_current(ticket) {
            tracing::debug!(?ticket, "dropping stale search response");
            return;
        }
        match outcome {
            Ok(results) => {
                self.search.publish(ticket, results);
            }
            Err(err) => self.search_notice = Some(err),
        }
    }

    pub async fn search(&mut self, api: &dyn BookApi, keyword: &str) {
        let Some(ticket) = self.begin_search(keyword) else {
            return;
        };
        let outcome = api.search(keyword.trim()).await;
        self.finish_search(ticket, outcome);
    }

    pub fn add_result(&mut self, item_id: ItemId) -> bool {
        let Some(hit) = self
            .search_results()
            .and_then(|results| results.iter().find(|r| r.item_id == item_id))
        else {
            return false;
        };
        let book = SelectedBook::from_search(hit);
        self.selection.add(book)
    }

    pub fn begin_analysis(&mut self) -> Result<(Ticket, BundleRequest), BundleError> {
        let request = BundleRequest::from_selection(&self.selection)?;
        self.analysis_notice = None;
        self.analysis.clear();
        Ok((self.analysis.issue(), request))
    }

    pub fn finish_analysis(&mut self, ticket: Ticket, outcome: Result<BundleResult, BundleError>) {
        if !self.analysis.is_current(ticket) {
            tracing::debug!(?ticket, "dropping stale analysis response");
            return;
        }
        match outcome {
            Ok(result) => {
                self.analysis.publish(ticket, result);
            }
            Err(err) => self.analysis_notice = Some(err),
        }
    }

    pub async fn analyze(&mut self, api: &dyn BookApi) -> Result<(), BundleError> {
        let (ticket, request) = self.begin_analysis()?;
        let outcome = api.analyze(&request).await;
        self.finish_analysis(ticket, outcome);
        Ok(())
    }
}

fn write_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("write json")?;
    stdout.write_all(b"\n").context("write newline")?;
    Ok(())
}

fn load_location(raw: &str) -> anyhow::Result<Loaded> {
    let location = Url::parse(raw).context("parse --url")?;
    Ok(Session::load(&location))
}

#[derive(Serialize)]
struct ImportOutput<'a> {
    books: &'a [SelectedBook],
    location: Option<&'a str>,
}

pub fn import(args: ImportArgs) -> anyhow::Result<()> {
    let loaded = load_location(&args.url)?;
    if let Some(location) = &loaded.replace_location {
        tracing::info!(%location, "replace location");
    }
    write_json(&ImportOutput {
        books: loaded.session.selection.list(),
        location: loaded.replace_location.as_ref().map(Url::as_str),
    })
}

pub async fn search(args: SearchArgs) -> anyhow::Result<()> {
    let config = AppConfig::from_env()
        .context("load config")?
        .with_overrides(None, args.api_url.as_deref())?;
    let api = HttpBookApi::new(&config.api_url)?;

    let mut session = Session::new();
    session.search(&api, &args.keyword).await;
    if let Some(err) = session.search_notice() {
        return Err(err.clone().into());
    }
    write_json(&session.search_results().unwrap_or_default())
}

pub async fn analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = AppConfig::from_env()
        .context("load config")?
        .with_overrides(None, args.api_url.as_deref())?;
    let api = HttpBookApi::new(&config.api_url)?;

    let mut session = load_location(&args.url)?.session;
    if let Some(condition) = args.min_condition {
        session.selection.update_all_conditions(condition);
    }
    session.analyze(&api).await?;
    if let Some(err) = session.analysis_notice() {
        return Err(err.clone().into());
    }
    match session.bundle_result() {
        Some(result) => write_json(result),
        None => anyhow::bail!("analysis produced no result"),
    }
}

pub async fn health(args: HealthArgs) -> anyhow::Result<()> {
    let config = AppConfig::from_env()
        .context("load config")?
        .with_overrides(None, args.api_url.as_deref())?;
    let api = HttpBookApi::new(&config.api_url)?;
    let healthy = api.health().await;
    println!("{}", if healthy { "ok" } else { "unavailable" });
    if !healthy {
        anyhow::bail!("backend is not healthy: {}", config.api_url);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::formats::{BookRecord, Condition};

    struct FakeApi {
        results: Vec<SearchResult>,
        fail_analysis: bool,
        analyzed: Mutex<Vec<BundleRequest>>,
    }

    impl FakeApi {
        fn new() -> Self {
            Self {
                results: vec![hit(1), hit(2)],
                fail_analysis: false,
                analyzed: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl BookApi for FakeApi {
        async fn search(&self, _keyword: &str) -> Result<Vec<SearchResult>, BundleError> {
            Ok(self.results.clone())
        }

        async fn analyze(&self, request: &BundleRequest) -> Result<BundleResult, BundleError> {
            self.analyzed.lock().unwrap().push(request.clone());
            if self.fail_analysis {
                return Err(BundleError::AnalysisFailed("server responded 500".to_owned()));
            }
            Ok(BundleResult {
                requested_books: request.books.clone(),
                total_requested_count: request.books.len() as u32,
                sellers: Vec::new(),
                has_complete_seller: false,
                analysis_time_ms: 5,
            })
        }

        async fn health(&self) -> bool {
            true
        }
    }

    fn hit(item_id: ItemId) -> SearchResult {
        SearchResult {
            item_id,
            isbn13: None,
            title: format!("hit {item_id}"),
            author: Some("author".to_owned()),
            publisher: None,
            pub_date: None,
            cover: None,
            price_standard: Some(10000),
            price_sales: None,
            used_count: Some(3),
            used_min_price: Some(4000),
        }
    }

    fn record(item_id: ItemId) -> BookRecord {
        BookRecord {
            item_id,
            title: format!("cart {item_id}"),
            condition: Condition::Best,
            unit_price: 5000,
            quantity: 1,
            cover_url: None,
            product_url: format!("https://shop.test/{item_id}"),
        }
    }

    #[test]
    fn load_imports_handoff_and_rewrites_location() {
        let app = Url::parse("http://localhost:5173/").unwrap();
        let url = crate::handoff::handoff_url(&app, &[record(1), record(2), record(1)]).unwrap();

        let loaded = Session::load(&url);
        assert_eq!(loaded.session.selection.item_ids(), vec![1, 2]);
        assert_eq!(loaded.session.import_banner(), Some(2));
        assert_eq!(
            loaded.replace_location.map(|u| u.to_string()),
            Some("http://localhost:5173/".to_owned())
        );
    }

    #[test]
    fn tampered_handoff_leaves_session_empty() {
        use base64::Engine as _;
        let token = base64::engine::general_purpose::STANDARD.encode("{\"broken\":");
        let url = Url::parse(&format!("http://localhost:5173/?from=extension#data={token}")).unwrap();

        let loaded = Session::load(&url);
        assert!(loaded.session.selection.is_empty());
        assert!(loaded.session.search_notice().is_none());
        assert!(loaded.session.analysis_notice().is_none());
        assert!(loaded.replace_location.is_none());
    }

    #[test]
    fn stale_search_response_is_discarded() {
        let mut session = Session::new();
        let first = session.begin_search("clean").unwrap();
        let second = session.begin_search("clean code").unwrap();

        session.finish_search(second, Ok(vec![hit(2)]));
        session.finish_search(first, Ok(vec![hit(1)]));
        assert_eq!(session.search_results().unwrap()[0].item_id, 2);

        session.finish_search(first, Err(BundleError::SearchFailed("late".to_owned())));
        assert!(session.search_notice().is_none());
    }

    #[test]
    fn blank_keyword_does_not_search() {
        let mut session = Session::new();
        assert!(session.begin_search("   ").is_none());
    }

    #[tokio::test]
    async fn search_then_add_uses_fair_default() {
        let api = FakeApi::new();
        let mut session = Session::new();
        session.search(&api, "refactoring").await;

        assert!(session.add_result(2));
        assert!(!session.add_result(2));
        assert!(!session.add_result(99));
        let book = session.selection.get(2).unwrap();
        assert_eq!(book.min_condition, Condition::Fair);
        assert_eq!(book.author.as_deref(), Some("author"));
    }

    #[tokio::test]
    async fn analysis_requires_two_books() {
        let api = FakeApi::new();
        let mut session = Session::new();
        session.search(&api, "x").await;
        session.add_result(1);

        assert_eq!(
            session.analyze(&api).await,
            Err(BundleError::TooFewBooks { count: 1 })
        );
        assert!(api.analyzed.lock().unwrap().is_empty());

        session.add_result(2);
        session.analyze(&api).await.unwrap();
        assert_eq!(session.bundle_result().unwrap().total_requested_count, 2);

        session.close_result();
        assert!(session.bundle_result().is_none());
    }

    #[tokio::test]
    async fn failed_analysis_is_a_dismissible_notice() {
        let mut api = FakeApi::new();
        api.fail_analysis = true;
        let mut session = Session::new();
        session.search(&api, "x").await;
        session.add_result(1);
        session.add_result(2);

        session.analyze(&api).await.unwrap();
        assert!(matches!(
            session.analysis_notice(),
            Some(BundleError::AnalysisFailed(_))
        ));
        assert!(session.bundle_result().is_none());

        session.dismiss_analysis_notice();
        assert!(session.analysis_notice().is_none());

        api.fail_analysis = false;
        session.analyze(&api).await.unwrap();
        assert!(session.bundle_result().is_some());
    }

    #[test]
    fn stale_analysis_result_is_discarded() {
        let mut session = Session::new();
        session.selection = SelectionStore::from_books([SelectedBook::from(record(1)), SelectedBook::from(record(2))]);

        let (first, _) = session.begin_analysis().unwrap();
        let (second, request) = session.begin_analysis().unwrap();
        let result = BundleResult {
            requested_books: request.books.clone(),
            total_requested_count: 2,
            sellers: Vec::new(),
            has_complete_seller: true,
            analysis_time_ms: 1,
        };
        session.finish_analysis(second, Ok(result));
        session.finish_analysis(first, Err(BundleError::AnalysisFailed("late".to_owned())));

        assert!(session.bundle_result().unwrap().has_complete_seller);
        assert!(session.analysis_notice().is_none());
    }

    #[test]
    fn notices_survive_the_other_channel_starting() {
        let mut session = Session::new();
        session.selection = SelectionStore::from_books([
            SelectedBook::from(record(1)),
            SelectedBook::from(record(2)),
        ]);

        let (analysis, _) = session.begin_analysis().unwrap();
        session.finish_analysis(analysis, Err(BundleError::AnalysisFailed("500".to_owned())));
        let search = session.begin_search("x").unwrap();
        assert!(matches!(
            session.analysis_notice(),
            Some(BundleError::AnalysisFailed(_))
        ));

        session.finish_search(search, Err(BundleError::SearchFailed("timeout".to_owned())));
        session.begin_analysis().unwrap();
        assert!(matches!(
            session.search_notice(),
            Some(BundleError::SearchFailed(_))
        ));
        assert!(session.analysis_notice().is_none());

        session.dismiss_search_notice();
        assert!(session.search_notice().is_none());
    }
}
