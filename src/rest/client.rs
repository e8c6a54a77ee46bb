use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    model::{CommittedTransaction, TxHash},
    utils::conf::Conf,
    view::ViewRequest,
};

use super::FullnodeApi;

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    error_code: Option<String>,
}

#[derive(Clone)]
pub struct FullnodeApiHttpClient {
    pub url: Url,
    pub reqwest_client: reqwest::Client,
    pub poll_interval: Duration,
    pub retry: Option<(usize, Duration)>,
}

impl FullnodeApiHttpClient {
    pub fn new(url: String) -> Result<Self> {
        let mut url = Url::parse(&url).context(format!("parsing node url {url}"))?;
        if !url.path().ends_with('/') {
            url.set_path(&format!("{}/", url.path()));
        }
        Ok(FullnodeApiHttpClient {
            url,
            reqwest_client: reqwest::Client::new(),
            poll_interval: Duration::from_millis(500),
            retry: None,
        })
    }

    pub fn from_conf(conf: &Conf) -> Result<Self> {
        let mut client = Self::new(conf.node_url())?.with_poll_interval(conf.poll_interval());
        if conf.query_retries > 0 {
            client = client.with_retry(conf.query_retries, conf.query_retry_delay());
        }
        Ok(client)
    }

    /// Create a new client retrying reads `n` times, waiting `duration` before each retry
    pub fn with_retry(mut self, n: usize, duration: Duration) -> Self {
        self.retry = Some((n, duration));
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sends a read request, retrying transport errors within the retry budget.
    async fn send_read(&self, request: RequestBuilder, context_msg: &str) -> Result<Response> {
        let (retries, delay) = self.retry.unwrap_or((0, Duration::ZERO));
        let mut attempt = 0;
        loop {
            let req = request
                .try_clone()
                .context("request cannot be cloned for retry")?;
            match req.send().await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < retries => {
                    attempt += 1;
                    warn!("{context_msg}: {e}, retry {attempt}/{retries}");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e).context(context_msg.to_string()),
            }
        }
    }

    async fn api_error(response: Response, context_msg: &str) -> anyhow::Error {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiErrorBody>(&text) {
            Ok(body) => anyhow::anyhow!(
                "{context_msg}: node answered {status} ({}): {}",
                body.error_code.as_deref().unwrap_or("unknown"),
                body.message
            ),
            Err(_) => anyhow::anyhow!("{context_msg}: node answered {status}: {text}"),
        }
    }

    pub async fn view(&self, request: &ViewRequest) -> Result<Vec<serde_json::Value>> {
        let context_msg = format!("calling view function {}", request.function);
        let response = self
            .send_read(
                self.reqwest_client
                    .post(format!("{}v1/view", self.url))
                    .json(request),
                &context_msg,
            )
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response, &context_msg).await);
        }
        response
            .json::<Vec<serde_json::Value>>()
            .await
            .context(format!("reading {} response", request.function))
    }

    /// Polls the transaction by hash until it leaves the pending state.
    pub async fn wait_for_transaction(&self, hash: &TxHash) -> Result<CommittedTransaction> {
        let context_msg = format!("waiting for transaction {hash}");
        loop {
            let response = self
                .send_read(
                    self.reqwest_client
                        .get(format!("{}v1/transactions/by_hash/{hash}", self.url)),
                    &context_msg,
                )
                .await?;

            match response.status() {
                StatusCode::NOT_FOUND => {
                    debug!("Transaction {hash} not known to the node yet");
                }
                status if status.is_success() => {
                    let body: serde_json::Value = response
                        .json()
                        .await
                        .context(format!("reading transaction {hash}"))?;
                    if body.get("type").and_then(|t| t.as_str()) == Some("pending_transaction") {
                        debug!("Transaction {hash} still pending");
                    } else {
                        return serde_json::from_value(body)
                            .context(format!("decoding committed transaction {hash}"));
                    }
                }
                _ => return Err(Self::api_error(response, &context_msg).await),
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    pub async fn get_ledger_version(&self) -> Result<u64> {
        #[derive(Deserialize)]
        struct LedgerInfo {
            ledger_version: String,
        }

        let response = self
            .send_read(
                self.reqwest_client.get(format!("{}v1", self.url)),
                "getting ledger info",
            )
            .await?;
        if !response.status().is_success() {
            bail!("getting ledger info: node answered {}", response.status());
        }
        let info: LedgerInfo = response
            .json()
            .await
            .context("reading ledger info response")?;
        info.ledger_version
            .parse()
            .context("parsing ledger version")
    }
}

#[async_trait]
impl FullnodeApi for FullnodeApiHttpClient {
    async fn view(&self, request: &ViewRequest) -> Result<Vec<serde_json::Value>> {
        FullnodeApiHttpClient::view(self, request).await
    }

    async fn wait_for_transaction(&self, hash: &TxHash) -> Result<CommittedTransaction> {
        FullnodeApiHttpClient::wait_for_transaction(self, hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_gets_trailing_slash() {
        let client = FullnodeApiHttpClient::new("http://localhost:8080/fullnode".into()).unwrap();
        assert_eq!(client.url.as_str(), "http://localhost:8080/fullnode/");
        let client = FullnodeApiHttpClient::new("http://localhost:8080".into()).unwrap();
        assert_eq!(client.url.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn retry_is_opt_in() {
        let client = FullnodeApiHttpClient::new("http://localhost:8080/".into()).unwrap();
        assert!(client.retry.is_none());
        let client = client.with_retry(3, Duration::from_millis(10));
        assert_eq!(client.retry, Some((3, Duration::from_millis(10))));
    }
}
