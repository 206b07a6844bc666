use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use shared::{domain::SeismicEvent, error::FetchError, protocol::FeatureCollection};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::{config::Settings, query::Query};

#[async_trait]
pub trait EventFetcher: Send + Sync {
    /// Performs one request for `query`. Resolves to `FetchError::Cancelled`
    /// as soon as `cancel` fires, dropping the transfer.
    async fn fetch(
        &self,
        query: &Query,
        cancel: CancellationToken,
    ) -> Result<Vec<SeismicEvent>, FetchError>;
}

pub struct HttpEventFetcher {
    http: Client,
    settings: Settings,
}

impl HttpEventFetcher {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("failed to build http client")?;
        Ok(Self { http, settings })
    }

    pub fn client(&self) -> &Client {
        &self.http
    }

    async fn fetch_url(&self, url: Url) -> Result<Vec<SeismicEvent>, FetchError> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let batch = FeatureCollection::decode(&body)?.normalize();

        if batch.dropped_incomplete > 0 || batch.dropped_undecodable > 0 {
            debug!(
                url = %url,
                incomplete = batch.dropped_incomplete,
                undecodable = batch.dropped_undecodable,
                "dropped records without usable geometry"
            );
        }
        info!(url = %url, count = batch.events.len(), "fetched earthquakes");
        Ok(batch.events)
    }
}

#[async_trait]
impl EventFetcher for HttpEventFetcher {
    async fn fetch(
        &self,
        query: &Query,
        cancel: CancellationToken,
    ) -> Result<Vec<SeismicEvent>, FetchError> {
        let url = query
            .url(&self.settings)
            .map_err(|err| FetchError::Transport(format!("invalid request url: {err}")))?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            result = self.fetch_url(url) => result,
        }
    }
}

#[cfg(test)]
#[path = "tests/fetcher_tests.rs"]
mod tests;
