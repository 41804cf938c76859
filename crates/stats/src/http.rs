use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{FetchError, StatsProvider, StatsQuery};

/// Connection settings for the stats gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSettings {
    /// Gateway base URL. Query paths are appended below it.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_ms: u64,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8787/v1/".to_string(),
            timeout_ms: 10_000,
            user_agent: concat!("sbechat/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// [`StatsProvider`] backed by an HTTP gateway serving one JSON document per query.
///
/// Routes are `<base>/<kind>/<player>` for player queries, `<base>/election`, and
/// `<base>/lowest-bin?query=<text>`.
#[derive(Debug, Clone)]
pub struct HttpStatsProvider {
    client: Client,
    base: Url,
}

impl HttpStatsProvider {
    /// Build a client for the configured gateway.
    pub fn new(settings: &StatsSettings) -> Result<Self, FetchError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| FetchError::InvalidUrl(format!("{}: {err}", settings.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(settings.base_url.clone()));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms.max(1)))
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self { client, base })
    }

    /// URL the query is sent to.
    pub fn url_for(&self, query: &StatsQuery) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| FetchError::InvalidUrl(self.base.to_string()))?;
            segments.pop_if_empty().push(query.kind());
            if let Some(player) = query.player() {
                segments.push(player);
            }
        }
        if let StatsQuery::LowestBin { query } = query {
            url.query_pairs_mut().append_pair("query", query);
        }
        Ok(url)
    }
}

#[async_trait]
impl StatsProvider for HttpStatsProvider {
    async fn fetch(&self, query: &StatsQuery) -> Result<Value, FetchError> {
        let url = self.url_for(query)?;
        debug!(%url, "fetching stats");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(query.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
