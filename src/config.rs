use anyhow::Context as _;
use url::Url;

pub const DEFAULT_APP_URL: &str = "http://localhost:5173";
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub app_url: Url,
    pub api_url: Url,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let app_url = env_or("BOOKBUNDLE_APP_URL", DEFAULT_APP_URL);
        let api_url = env_or("BOOKBUNDLE_API_URL", DEFAULT_API_URL);
        Ok(Self {
            app_url: parse_http_url(&app_url)
                .with_context(|| format!("invalid BOOKBUNDLE_APP_URL={app_url:?}"))?,
            api_url: parse_http_url(&api_url)
                .with_context(|| format!("invalid BOOKBUNDLE_API_URL={api_url:?}"))?,
        })
    }

    pub fn with_overrides(
        mut self,
        app_url: Option<&str>,
        api_url: Option<&str>,
    ) -> anyhow::Result<Self> {
        if let Some(raw) = app_url {
            self.app_url = parse_http_url(raw).context("parse --app-url")?;
        }
        if let Some(raw) = api_url {
            self.api_url = parse_http_url(raw).context("parse --api-url")?;
        }
        Ok(self)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

pub fn parse_http_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("parse url: {raw}"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("url must be http/https: {url}");
    }
    Ok(url)
}
