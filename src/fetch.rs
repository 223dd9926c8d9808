use std::time::Duration;

use crate::config::Config;
use crate::error::{DiecastError, Result};

/// Anything that can hand back the HTML at a URL
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP page source (ureq)
pub struct HttpSource {
    agent: ureq::Agent,
    user_agent: String,
}

impl HttpSource {
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            user_agent: user_agent.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Duration::from_secs(config.timeout_secs), config.user_agent.clone())
    }
}

impl PageSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .agent
            .get(url)
            .header("User-Agent", &self.user_agent)
            .call()?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(DiecastError::HttpError(ureq::Error::StatusCode(status)));
        }

        Ok(response.into_body().read_to_string()?)
    }
}

/// Result of trying to fetch the catalog page for a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Fetched { url: String, html: String },
    /// The page could not be fetched; `url` is kept for the audit log
    Unavailable { url: String, reason: String },
}

impl PageOutcome {
    pub fn url(&self) -> &str {
        match self {
            PageOutcome::Fetched { url, .. } | PageOutcome::Unavailable { url, .. } => url,
        }
    }
}

/// Wiki page name for a model: curly apostrophes straightened, any
/// parenthesized suffix such as " (2019)" cut off, spaces as underscores.
pub fn page_name(model: &str) -> String {
    let straightened = model.trim().replace('\u{2019}', "'");
    let base = straightened
        .split(" (")
        .next()
        .unwrap_or_default();
    base.replace(' ', "_")
}

/// Build the lookup URL for `model` under the wiki at `base_url`
pub fn build_page_url(model: &str, base_url: &str) -> String {
    let encoded = urlencoding::encode(&page_name(model))
        .replace("%28", "(")
        .replace("%29", ")");
    format!("{}{}", base_url, encoded)
}

/// Fetch the catalog page for a model of the given brand.
///
/// Never fails: transport errors and non-200 responses come back as
/// [`PageOutcome::Unavailable`] carrying the URL that was tried.
pub fn resolve(model: &str, brand: &str, config: &Config, source: &dyn PageSource) -> PageOutcome {
    let url = build_page_url(model, config.source_for(brand));
    tracing::debug!(%url, "fetching catalog page");

    match source.fetch(&url) {
        Ok(html) => PageOutcome::Fetched { url, html },
        Err(e) => {
            tracing::warn!(%url, error = %e, "catalog page unavailable");
            PageOutcome::Unavailable {
                url,
                reason: e.to_string(),
            }
        }
    }
}
