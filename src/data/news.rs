//! News search API client
//!
//! Fetches article lists from a NewsAPI-compatible `/v2/everything` endpoint.
//! A non-empty search query becomes a keyword search sorted by publish date;
//! an empty one falls back to the configured default topic.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::Article;
use crate::fetcher::{DataKind, DataSource};

/// Base URL for the news API
pub const NEWS_API_BASE_URL: &str = "https://newsapi.org";

/// Topic requested when the user has not searched for anything
pub const DEFAULT_TOPIC: &str = "india";

/// Sort order requested for every query
const SORT_BY: &str = "publishedAt";

/// Errors that can occur when fetching news
#[derive(Debug, Error)]
pub enum NewsError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("news API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Server answered 200 but reported an error in the body
    #[error("news API error {code}: {message}")]
    Api { code: String, message: String },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// What to ask the news endpoint for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsRequest {
    /// Keyword search typed by the user
    Search(String),
    /// Default headlines topic
    Topic(String),
}

impl NewsRequest {
    /// Builds the request for a search box value
    ///
    /// Blank input (including a search box that was just cleared) requests
    /// the default topic again rather than repeating the previous search.
    pub fn from_query(query: &str, default_topic: &str) -> Self {
        let query = query.trim();
        if query.is_empty() {
            NewsRequest::Topic(default_topic.to_string())
        } else {
            NewsRequest::Search(query.to_string())
        }
    }

    /// The `q` parameter sent to the endpoint
    pub fn query_term(&self) -> &str {
        match self {
            NewsRequest::Search(q) | NewsRequest::Topic(q) => q,
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, NewsRequest::Search(_))
    }
}

/// Response envelope from the news API
#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

/// Client for the news search endpoint
#[derive(Debug, Clone)]
pub struct NewsClient {
    client: Client,
    /// Base URL (allows override for testing)
    base_url: String,
    api_key: String,
    language: String,
}

impl NewsClient {
    /// Creates a client against the public endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: NEWS_API_BASE_URL.to_string(),
            api_key: api_key.into(),
            language: "en".to_string(),
        }
    }

    /// Replaces the HTTP client, e.g. to set a timeout
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Points the client at a different server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Fetches the articles for a request
    ///
    /// # Returns
    /// * `Ok(Vec<Article>)` - Possibly empty list of articles
    /// * `Err(NewsError)` - Transport failure, non-2xx status, API error or bad JSON
    pub async fn fetch_news(&self, request: &NewsRequest) -> Result<Vec<Article>, NewsError> {
        let url = format!("{}/v2/everything", self.base_url);
        debug!(search = request.is_search(), q = request.query_term(), "requesting news");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", request.query_term()),
                ("sortBy", SORT_BY),
                ("language", self.language.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<NewsResponse>(&text)
                .ok()
                .and_then(|r| r.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(NewsError::Status {
                status: status.as_u16(),
                message,
            });
        }

        parse_response(&text)
    }
}

/// Parses a 2xx response body into its article list
fn parse_response(text: &str) -> Result<Vec<Article>, NewsError> {
    let response: NewsResponse = serde_json::from_str(text)?;

    if response.status.as_deref() == Some("error") {
        return Err(NewsError::Api {
            code: response.code.unwrap_or_else(|| "unknown".to_string()),
            message: response.message.unwrap_or_default(),
        });
    }

    Ok(response.articles)
}

#[async_trait]
impl DataSource for NewsClient {
    type Params = NewsRequest;
    type Value = Vec<Article>;
    type Error = NewsError;

    fn kind(&self) -> DataKind {
        DataKind::News
    }

    fn is_empty(value: &Vec<Article>) -> bool {
        value.is_empty()
    }

    async fn fetch(&self, params: &NewsRequest) -> Result<Vec<Article>, NewsError> {
        self.fetch_news(params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Sample valid news API response
    const VALID_RESPONSE: &str = r#"{
        "status": "ok",
        "totalResults": 2,
        "articles": [
            {
                "source": {"id": null, "name": "Example Times"},
                "author": "A. Writer",
                "title": "Monsoon reaches Delhi",
                "description": "Rain expected all week",
                "url": "https://example.com/monsoon",
                "urlToImage": "https://example.com/monsoon.jpg",
                "publishedAt": "2024-07-15T05:30:00Z",
                "content": "Full text..."
            },
            {
                "source": {"id": "bbc-news", "name": "BBC News"},
                "author": null,
                "title": "Second story",
                "description": null,
                "url": "https://example.com/second",
                "urlToImage": null,
                "publishedAt": "2024-07-15T04:00:00Z",
                "content": null
            }
        ]
    }"#;

    #[test]
    fn test_from_query_nonempty_is_search() {
        assert_eq!(
            NewsRequest::from_query("cricket", DEFAULT_TOPIC),
            NewsRequest::Search("cricket".to_string())
        );
    }

    #[test]
    fn test_from_query_empty_is_default_topic() {
        assert_eq!(
            NewsRequest::from_query("", DEFAULT_TOPIC),
            NewsRequest::Topic("india".to_string())
        );
        assert_eq!(
            NewsRequest::from_query("   ", "science"),
            NewsRequest::Topic("science".to_string())
        );
    }

    #[test]
    fn test_parse_valid_response() {
        let articles = parse_response(VALID_RESPONSE).expect("Failed to parse valid response");

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Monsoon reaches Delhi");
        assert_eq!(articles[0].id(), "https://example.com/monsoon");
        assert_eq!(articles[1].source_name(), Some("BBC News"));
        assert!(articles[1].description.is_none());
    }

    #[test]
    fn test_parse_error_body() {
        let body = r#"{"status":"error","code":"rateLimited","message":"Too many requests"}"#;
        match parse_response(body) {
            Err(NewsError::Api { code, message }) => {
                assert_eq!(code, "rateLimited");
                assert_eq!(message, "Too many requests");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(parse_response("<html>"), Err(NewsError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_fetch_search_sends_query_sorted_by_publish_date() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param("q", "monsoon rain"))
            .and(query_param("sortBy", "publishedAt"))
            .and(query_param("language", "en"))
            .and(query_param("apiKey", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RESPONSE))
            .expect(1)
            .mount(&server)
            .await;

        let client = NewsClient::new("secret").with_base_url(server.uri());
        let articles = client
            .fetch_news(&NewsRequest::Search("monsoon rain".to_string()))
            .await
            .expect("Fetch should succeed");

        assert_eq!(articles.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(ResponseTemplate::new(401).set_body_string(
                r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#,
            ))
            .mount(&server)
            .await;

        let client = NewsClient::new("bad").with_base_url(server.uri());
        let result = client.fetch_news(&NewsRequest::Topic("india".to_string())).await;

        match result {
            Err(NewsError::Status { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Your API key is invalid.");
            }
            other => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[test]
    fn test_with_base_url_trims_trailing_slash() {
        let client = NewsClient::new("k").with_base_url("http://localhost:1234/");
        assert_eq!(client.base_url, "http://localhost:1234");
    }
}
