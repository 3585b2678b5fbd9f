//! Balance lookups against the backend over HTTP

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use hyper::client::HttpConnector;
use hyper::{Body, Client, Request, StatusCode, Uri};
use wadwise_config::BackendConfig;
use wadwise_core::{BalanceSheet, BalanceSource, CoreError, CoreResult};
use wadwise_utils::urlqs;

/// `GET <base_url><balance_path>?date=..&aid=..`
pub struct HttpBalanceSource {
    client: Client<HttpConnector>,
    endpoint: String,
    timeout: Duration,
}

impl HttpBalanceSource {
    pub fn new(backend: &BackendConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: backend.balance_url(),
            timeout: Duration::from_millis(backend.timeout_ms),
        }
    }

    pub fn request_uri(&self, date: NaiveDate, aid: &str) -> String {
        let date = date.format("%Y-%m-%d").to_string();
        urlqs(&self.endpoint, &[("date", &date), ("aid", aid)])
    }

    async fn fetch(&self, uri: Uri) -> CoreResult<bytes::Bytes> {
        let request = Request::get(uri)
            .header("accept", "application/json")
            .body(Body::empty())
            .map_err(network_error)?;
        let response = self.client.request(request).await.map_err(network_error)?;
        if response.status() != StatusCode::OK {
            return Err(CoreError::NetworkError {
                message: format!("backend answered {}", response.status()),
            });
        }
        hyper::body::to_bytes(response.into_body()).await.map_err(network_error)
    }
}

fn network_error(e: impl std::fmt::Display) -> CoreError {
    CoreError::NetworkError { message: e.to_string() }
}

#[async_trait]
impl BalanceSource for HttpBalanceSource {
    async fn balance(&self, date: NaiveDate, aid: &str) -> CoreResult<BalanceSheet> {
        let uri: Uri = self.request_uri(date, aid).parse().map_err(network_error)?;
        log::debug!("Fetching balance: {}", uri);

        let body = tokio::time::timeout(self.timeout, self.fetch(uri))
            .await
            .map_err(|_| CoreError::NetworkError {
                message: format!("balance lookup timed out after {:?}", self.timeout),
            })??;

        parse_balance(&body)
    }
}

/// Decode `{"result": {"<cur>": <amount>}}`
pub fn parse_balance(body: &[u8]) -> CoreResult<BalanceSheet> {
    serde_json::from_slice(body).map_err(|e| CoreError::InvalidFormat {
        message: format!("balance response: {}", e),
    })
}
