//! HTTP client for the SEC EDGAR APIs.

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use roe_core::{
    Cik, FactsDocument, FilingsSource, Result, RoeError, Submissions, TickerDirectory,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::rate_limiter::RateLimiter;
use crate::wire::{self, CompanyFactsResponse, CompanyTickerInfo, SubmissionsResponse};

/// SEC EDGAR API base URL
pub const EDGAR_BASE_URL: &str = "https://data.sec.gov";

/// SEC company tickers URL
pub const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Identifying user agent, e.g. `"AppName/1.0 (contact@example.com)"`.
    pub user_agent: String,
    /// Base URL of the submissions and company-facts APIs.
    pub data_base_url: String,
    /// URL of the ticker directory file.
    pub tickers_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration pointing at the public SEC endpoints.
    #[must_use]
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            data_base_url: EDGAR_BASE_URL.to_string(),
            tickers_url: COMPANY_TICKERS_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the submissions / company-facts base URL.
    #[must_use]
    pub fn with_data_base_url(mut self, url: impl Into<String>) -> Self {
        self.data_base_url = url.into();
        self
    }

    /// Sets the ticker directory URL.
    #[must_use]
    pub fn with_tickers_url(mut self, url: impl Into<String>) -> Self {
        self.tickers_url = url.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// SEC EDGAR client.
///
/// Every request first waits on the shared [`RateLimiter`] and carries the
/// configured user agent. The client never retries.
#[derive(Debug, Clone)]
pub struct EdgarClient {
    http: reqwest::Client,
    limiter: Arc<RateLimiter>,
    config: ClientConfig,
}

impl EdgarClient {
    /// Create a client drawing on `limiter`.
    ///
    /// The SEC requires an identifying user agent. An empty or non-ASCII
    /// value is rejected with `InvalidParameter`.
    ///
    /// # Example
    /// ```
    /// use roe_edgar::{ClientConfig, EdgarClient, RateLimiter};
    /// use std::sync::Arc;
    ///
    /// let limiter = Arc::new(RateLimiter::default());
    /// let client = EdgarClient::new(ClientConfig::new("MyApp/1.0 (contact@example.com)"), limiter)?;
    /// # Ok::<(), roe_core::RoeError>(())
    /// ```
    pub fn new(config: ClientConfig, limiter: Arc<RateLimiter>) -> Result<Self> {
        let user_agent = config.user_agent.trim();
        if user_agent.is_empty() {
            return Err(RoeError::InvalidParameter(
                "A user agent identifying the caller is required".to_string(),
            ));
        }
        let header = HeaderValue::from_str(user_agent).map_err(|e| {
            RoeError::InvalidParameter(format!("Invalid user agent {user_agent:?}: {e}"))
        })?;

        let http = reqwest::Client::builder()
            .user_agent(header)
            .timeout(config.timeout)
            .build()
            .map_err(|e| RoeError::Other(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            limiter,
            config,
        })
    }

    /// Returns the rate limiter this client draws on.
    #[must_use]
    pub const fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn submissions_url(&self, cik: Cik) -> String {
        format!(
            "{}/submissions/CIK{}.json",
            self.config.data_base_url.trim_end_matches('/'),
            cik.padded()
        )
    }

    fn facts_url(&self, cik: Cik) -> String {
        format!(
            "{}/api/xbrl/companyfacts/CIK{}.json",
            self.config.data_base_url.trim_end_matches('/'),
            cik.padded()
        )
    }

    /// Rate-limited GET decoding a JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        self.limiter.acquire().await;

        debug!(url, "Fetching {what}");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| RoeError::Network(format!("Failed to fetch {what}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RoeError::Http {
                status: status.as_u16(),
                message: format!("Failed to fetch {what}: {status}"),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RoeError::Network(format!("Failed to read {what}: {e}")))?;

        serde_json::from_slice(&body)
            .map_err(|e| RoeError::Decode(format!("Failed to parse {what}: {e}")))
    }
}

#[async_trait]
impl FilingsSource for EdgarClient {
    fn name(&self) -> &str {
        "SEC EDGAR"
    }

    #[instrument(skip(self))]
    async fn fetch_ticker_directory(&self) -> Result<TickerDirectory> {
        let rows: HashMap<String, CompanyTickerInfo> = self
            .get_json(&self.config.tickers_url, "company tickers")
            .await?;
        let directory = wire::into_directory(rows);
        debug!(entries = directory.len(), "Loaded ticker directory");
        Ok(directory)
    }

    #[instrument(skip(self), fields(cik = %cik))]
    async fn fetch_submissions(&self, cik: Cik) -> Result<Submissions> {
        let what = format!("submissions for CIK {cik}");
        let response: SubmissionsResponse = self.get_json(&self.submissions_url(cik), &what).await?;
        Ok(response.into_submissions(cik))
    }

    #[instrument(skip(self), fields(cik = %cik))]
    async fn fetch_facts(&self, cik: Cik) -> Result<FactsDocument> {
        let what = format!("company facts for CIK {cik}");
        let response: CompanyFactsResponse = self.get_json(&self.facts_url(cik), &what).await?;
        let (document, dropped) = response.into_document(cik);
        if dropped > 0 {
            debug!(dropped, "Dropped malformed fact entries");
        }
        debug!(
            observations = document.observation_count(),
            "Loaded company facts"
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limiter::RateLimitConfig;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const AGENT: &str = "RoeTest/1.0 (test@example.com)";

    fn client(server: &MockServer) -> EdgarClient {
        let limiter = RateLimiter::new(
            RateLimitConfig::default().with_min_interval(Duration::from_millis(1)),
        )
        .unwrap();
        let config = ClientConfig::new(AGENT)
            .with_data_base_url(server.uri())
            .with_tickers_url(format!("{}/files/company_tickers.json", server.uri()));
        EdgarClient::new(config, Arc::new(limiter)).unwrap()
    }

    #[tokio::test]
    async fn test_submissions_send_user_agent_and_padded_cik() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/submissions/CIK0000072741.json"))
            .and(header("user-agent", AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cik": "72741",
                "name": "EVERSOURCE ENERGY",
                "sic": "4911",
                "sicDescription": "Electric Services",
                "tickers": ["ES"],
                "filings": {"recent": {
                    "accessionNumber": ["0000072741-24-000010"],
                    "filingDate": ["2024-02-14"],
                    "reportDate": ["2023-12-31"],
                    "form": ["10-K"],
                    "primaryDocument": ["es-20231231.htm"]
                }}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let submissions = client(&server)
            .fetch_submissions(Cik::new(72741))
            .await
            .unwrap();
        assert_eq!(submissions.name, "EVERSOURCE ENERGY");
        assert_eq!(submissions.sic.as_deref(), Some("4911"));
        assert_eq!(submissions.filings[0].form, "10-K");
    }

    #[tokio::test]
    async fn test_facts_are_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/xbrl/companyfacts/CIK0001326160.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cik": 1326160,
                "entityName": "Duke Energy CORP",
                "facts": {"us-gaap": {"StockholdersEquity": {"units": {"USD": [
                    {"end": "2023-12-31", "val": 49322000000u64,
                     "accn": "0001326160-24-000012", "fy": 2023, "fp": "FY",
                     "form": "10-K", "filed": "2024-02-27"}
                ]}}}}
            })))
            .mount(&server)
            .await;

        let facts = client(&server).fetch_facts(Cik::new(1326160)).await.unwrap();
        let equity = facts.observations("StockholdersEquity", "USD").unwrap();
        assert_eq!(equity.len(), 1);
        assert_eq!(equity[0].value, 49_322_000_000.0);
        assert!(equity[0].start.is_none());
    }

    #[tokio::test]
    async fn test_ticker_directory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/company_tickers.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "0": {"cik_str": 1326160, "ticker": "DUK", "title": "Duke Energy CORP"},
                "1": {"cik_str": 92122, "ticker": "SO", "title": "SOUTHERN CO"}
            })))
            .mount(&server)
            .await;

        let directory = client(&server).fetch_ticker_directory().await.unwrap();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.lookup("duk").unwrap().cik, Cik::new(1326160));
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_facts(Cik::new(4904))
            .await
            .unwrap_err();
        assert!(matches!(err, RoeError::Http { status: 503, .. }));
        assert!(err.to_string().contains("503"));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_not_found_is_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_submissions(Cik::new(999999))
            .await
            .unwrap_err();
        assert!(matches!(err, RoeError::Http { status: 404, .. }));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_too_many_requests_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_facts(Cik::new(4904))
            .await
            .unwrap_err();
        assert!(matches!(err, RoeError::Http { status: 429, .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_submissions(Cik::new(4904))
            .await
            .unwrap_err();
        assert!(matches!(err, RoeError::Decode(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_user_agent_is_required() {
        let limiter = Arc::new(RateLimiter::default());
        assert!(matches!(
            EdgarClient::new(ClientConfig::new("   "), Arc::clone(&limiter)),
            Err(RoeError::InvalidParameter(_))
        ));
        assert!(matches!(
            EdgarClient::new(ClientConfig::new("bad\nagent"), limiter),
            Err(RoeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_urls_use_padded_cik() {
        let client = EdgarClient::new(
            ClientConfig::new(AGENT).with_data_base_url("https://data.sec.gov/"),
            Arc::new(RateLimiter::default()),
        )
        .unwrap();
        assert_eq!(
            client.facts_url(Cik::new(320193)),
            "https://data.sec.gov/api/xbrl/companyfacts/CIK0000320193.json"
        );
        assert_eq!(
            client.submissions_url(Cik::new(320193)),
            "https://data.sec.gov/submissions/CIK0000320193.json"
        );
    }
}
