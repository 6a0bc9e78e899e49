use crate::core::{CurrencyPair, FetchError, QuoteProvider, RawQuote};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Upstream provider serving `GET <base_url>/<BASE>-<QUOTE>` with a JSON map
/// from `<BASE><QUOTE>` to the quote record.
pub struct AwesomeApiProvider {
    base_url: String,
    client: reqwest::Client,
    strict_pair: bool,
}

impl AwesomeApiProvider {
    pub fn new(base_url: &str) -> Self {
        AwesomeApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            strict_pair: false,
        }
    }

    /// Report a pair missing from the response as `FetchError::PairNotFound`.
    pub fn with_strict_pair(mut self, strict: bool) -> Self {
        self.strict_pair = strict;
        self
    }

    async fn request(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;
        debug!(status = %response.status(), "Received upstream response");

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl QuoteProvider for AwesomeApiProvider {
    #[instrument(name = "UpstreamFetch", skip(self), fields(pair = %pair))]
    async fn fetch_quote(
        &self,
        pair: &CurrencyPair,
        deadline: Duration,
    ) -> Result<RawQuote, FetchError> {
        if deadline.is_zero() {
            return Err(FetchError::InvalidDeadline);
        }

        let url = format!("{}/{}", self.base_url, pair.path());
        debug!("Requesting quote from {}", url);

        let body = tokio::time::timeout(deadline, self.request(&url))
            .await
            .map_err(|_| FetchError::DeadlineExceeded(deadline))??;

        let mut quotes: HashMap<String, RawQuote> = serde_json::from_slice(&body)?;
        match quotes.remove(&pair.key()) {
            Some(quote) => Ok(quote),
            None if self.strict_pair => Err(FetchError::PairNotFound(pair.key())),
            None => {
                warn!(key = %pair.key(), "Pair missing from upstream response, relaying empty quote");
                Ok(RawQuote::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MOCK_JSON: &str = r#"{
        "USDBRL": {
            "code": "USD",
            "codein": "BRL",
            "name": "Dólar Americano/Real Brasileiro",
            "high": "5.4545",
            "low": "5.4021",
            "varBid": "0.0112",
            "pctChange": "0.21",
            "bid": "5.43",
            "ask": "5.4311",
            "timestamp": "1718900000",
            "create_date": "2024-06-20 17:59:59"
        }
    }"#;

    async fn create_mock_server(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/json/last/USD-BRL"))
            .respond_with(template)
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn provider_for(mock_server: &MockServer) -> AwesomeApiProvider {
        AwesomeApiProvider::new(&format!("{}/json/last/", mock_server.uri()))
    }

    #[tokio::test]
    async fn test_successful_fetch() {
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(MOCK_JSON)).await;
        let provider = provider_for(&mock_server);

        let quote = provider
            .fetch_quote(&CurrencyPair::default(), Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(quote.bid, "5.43");
        assert_eq!(quote.code, "USD");
        assert_eq!(quote.codein, "BRL");
        assert_eq!(quote.var_bid, "0.0112");
        assert_eq!(quote.pct_change, "0.21");
        assert_eq!(quote.create_date, "2024-06-20 17:59:59");
    }

    #[tokio::test]
    async fn test_values_are_passed_through_verbatim() {
        let body = r#"{"USDBRL": {"bid": "  not-a-number ", "ask": ""}}"#;
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(body)).await;
        let provider = provider_for(&mock_server);

        let quote = provider
            .fetch_quote(&CurrencyPair::default(), Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(quote.bid, "  not-a-number ");
        assert_eq!(quote.ask, "");
    }

    #[tokio::test]
    async fn test_deadline_elapses() {
        let mock_server = create_mock_server(
            ResponseTemplate::new(200)
                .set_body_string(MOCK_JSON)
                .set_delay(Duration::from_millis(500)),
        )
        .await;
        let provider = provider_for(&mock_server);

        let result = provider
            .fetch_quote(&CurrencyPair::default(), Duration::from_millis(50))
            .await;

        assert!(matches!(result, Err(FetchError::DeadlineExceeded(_))));
    }

    #[tokio::test]
    async fn test_zero_deadline_is_rejected() {
        let provider = AwesomeApiProvider::new("http://127.0.0.1:1");
        let result = provider
            .fetch_quote(&CurrencyPair::default(), Duration::ZERO)
            .await;
        assert!(matches!(result, Err(FetchError::InvalidDeadline)));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string("<html>")).await;
        let provider = provider_for(&mock_server);

        let result = provider
            .fetch_quote(&CurrencyPair::default(), Duration::from_secs(2))
            .await;

        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_error_status() {
        let mock_server = create_mock_server(ResponseTemplate::new(503)).await;
        let provider = provider_for(&mock_server);

        let result = provider
            .fetch_quote(&CurrencyPair::default(), Duration::from_secs(2))
            .await;

        assert!(matches!(result, Err(FetchError::Status(s)) if s.as_u16() == 503));
    }

    #[tokio::test]
    async fn test_missing_pair_yields_empty_quote() {
        let body = r#"{"EURBRL": {"bid": "6.01"}}"#;
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(body)).await;
        let provider = provider_for(&mock_server);

        let quote = provider
            .fetch_quote(&CurrencyPair::default(), Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(quote, RawQuote::default());
    }

    #[tokio::test]
    async fn test_missing_pair_strict() {
        let body = r#"{"EURBRL": {"bid": "6.01"}}"#;
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(body)).await;
        let provider = provider_for(&mock_server).with_strict_pair(true);

        let result = provider
            .fetch_quote(&CurrencyPair::default(), Duration::from_secs(2))
            .await;

        assert!(matches!(result, Err(FetchError::PairNotFound(key)) if key == "USDBRL"));
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        // Nothing listens on port 1
        let provider = AwesomeApiProvider::new("http://127.0.0.1:1");
        let result = provider
            .fetch_quote(&CurrencyPair::default(), Duration::from_secs(2))
            .await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }
}
