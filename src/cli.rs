use clap::{Args, Parser, Subcommand};

use crate::formats::Condition;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Tell whether a tab is the marketplace cart page.
    Check(CheckArgs),
    /// Extract cart books from a saved cart page.
    Extract(ExtractArgs),
    /// Extract cart books and print the web app handoff URL.
    Send(SendArgs),
    /// Load the web app at a handoff URL and print the imported wishlist.
    Import(ImportArgs),
    /// Search titles on the backend.
    Search(SearchArgs),
    /// Import a handoff URL and request a seller bundle analysis.
    Analyze(AnalyzeArgs),
    /// Check backend liveness.
    Health(HealthArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// URL of the active tab.
    #[arg(long)]
    pub tab_url: String,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Saved cart page (HTML).
    #[arg(long)]
    pub page: String,

    /// URL the page was saved from (defaults to the cart page).
    #[arg(long)]
    pub tab_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Saved cart page (HTML).
    #[arg(long)]
    pub page: String,

    /// URL the page was saved from (defaults to the cart page).
    #[arg(long)]
    pub tab_url: Option<String>,

    /// Web app base URL (overrides BOOKBUNDLE_APP_URL).
    #[arg(long)]
    pub app_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Location the web app was opened at.
    #[arg(long)]
    pub url: String,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Title keyword.
    #[arg(long)]
    pub keyword: String,

    /// Backend API base URL (overrides BOOKBUNDLE_API_URL).
    #[arg(long)]
    pub api_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Handoff URL carrying the wishlist.
    #[arg(long)]
    pub url: String,

    /// Minimum acceptable condition applied to every book (best, good, fair).
    #[arg(long)]
    pub min_condition: Option<Condition>,

    /// Backend API base URL (overrides BOOKBUNDLE_API_URL).
    #[arg(long)]
    pub api_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct HealthArgs {
    /// Backend API base URL (overrides BOOKBUNDLE_API_URL).
    #[arg(long)]
    pub api_url: Option<String>,
}
