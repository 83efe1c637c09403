//! Book search against the external catalog API.
//!
//! Requests carry `applicationId`, `format=json`, `hits` and `title` as
//! query parameters. Transport failures, undecodable bodies and 5xx
//! responses are retried with exponential backoff; 4xx responses are
//! returned immediately. Once retries run out the caller gets a single
//! `ExternalServiceUnavailable` error carrying the last cause.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reviewboard_common::{AppError, AppResult, RetryConfig, config::BookSearchConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// Message shown to users when the catalog cannot be reached.
pub const UNAVAILABLE_MESSAGE: &str =
    "The book search service is unstable right now. Please try again later.";

/// One search hit, in the order the catalog ranked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub title: String,
    /// ISBN, or the JAN code when the ISBN is blank.
    pub isbn: Option<String>,
    pub item_url: Option<String>,
    /// First non-blank of the medium, small and large images.
    pub thumbnail_url: Option<String>,
}

/// Search capability used by the API layer.
#[async_trait]
pub trait BookSearch: Send + Sync {
    async fn search_by_title(&self, title: &str, limit: u32) -> AppResult<Vec<BookSummary>>;
}

pub type SharedBookSearch = Arc<dyn BookSearch>;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Items", default)]
    items: Vec<ItemWrapper>,
}

#[derive(Debug, Deserialize)]
struct ItemWrapper {
    #[serde(rename = "Item")]
    item: Option<Item>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Item {
    title: Option<String>,
    isbn: Option<String>,
    #[serde(rename = "isbnjan")]
    isbn_jan: Option<String>,
    item_url: Option<String>,
    small_image_url: Option<String>,
    medium_image_url: Option<String>,
    large_image_url: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<Item> for BookSummary {
    fn from(item: Item) -> Self {
        Self {
            title: item.title.unwrap_or_default(),
            isbn: non_blank(item.isbn).or_else(|| non_blank(item.isbn_jan)),
            item_url: non_blank(item.item_url),
            thumbnail_url: non_blank(item.medium_image_url)
                .or_else(|| non_blank(item.small_image_url))
                .or_else(|| non_blank(item.large_image_url)),
        }
    }
}

/// Outcome of a single failed attempt.
enum AttemptError {
    /// Worth retrying.
    Transient(String),
    /// The catalog refused the request; retrying will not help.
    Rejected { status: u16, message: String },
}

/// HTTP client for the external book catalog.
#[derive(Clone)]
pub struct BookSearchClient {
    client: Client,
    endpoint: String,
    application_id: Option<String>,
    retry: RetryConfig,
}

impl BookSearchClient {
    /// Create a client from configuration.
    ///
    /// A missing credential is not an error here: the client is built and
    /// every search fails with `NotConfigured` until one is provided.
    pub fn new(config: &BookSearchConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;

        if config.credential().is_none() {
            warn!("book_search.application_id is not set; book searches will fail until it is");
        }

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            application_id: config.credential().map(str::to_string),
            retry: RetryConfig::doubling(config.retries, config.initial_backoff_ms),
        })
    }

    /// Whether a credential is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.application_id.is_some()
    }

    /// Search the catalog by title.
    pub async fn search_by_title(&self, title: &str, limit: u32) -> AppResult<Vec<BookSummary>> {
        let Some(application_id) = self.application_id.as_deref() else {
            error!("Book search called without book_search.application_id");
            return Err(AppError::NotConfigured(
                "book_search.application_id".to_string(),
            ));
        };

        let mut retries = 0;
        loop {
            match self.search_once(application_id, title, limit).await {
                Ok(books) => {
                    debug!(title = %title, results = books.len(), attempt = retries + 1, "Book search succeeded");
                    return Ok(books);
                }
                Err(AttemptError::Rejected { status, message }) => {
                    warn!(title = %title, status = status, "Book search rejected by upstream");
                    return Err(AppError::UpstreamRejected { status, message });
                }
                Err(AttemptError::Transient(cause)) => {
                    if !self.retry.should_retry(retries) {
                        error!(
                            title = %title,
                            attempts = retries + 1,
                            cause = %cause,
                            "Book search failed after all retries"
                        );
                        return Err(AppError::ExternalServiceUnavailable {
                            message: UNAVAILABLE_MESSAGE.to_string(),
                            cause,
                        });
                    }

                    let delay = self.retry.delay_for_attempt(retries);
                    warn!(
                        title = %title,
                        attempt = retries + 1,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        cause = %cause,
                        "Book search failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retries += 1;
                }
            }
        }
    }

    async fn search_once(
        &self,
        application_id: &str,
        title: &str,
        limit: u32,
    ) -> Result<Vec<BookSummary>, AttemptError> {
        let hits = limit.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("applicationId", application_id),
                ("format", "json"),
                ("hits", hits.as_str()),
                ("title", title),
            ])
            .send()
            .await
            .map_err(|e| AttemptError::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AttemptError::Transient(format!("upstream returned {status}")));
        }
        if status.is_client_error() {
            let message = response.text().await.unwrap_or_default();
            return Err(AttemptError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::Transient(format!("invalid response body: {e}")))?;

        Ok(body
            .items
            .into_iter()
            .filter_map(|wrapper| wrapper.item)
            .map(BookSummary::from)
            .collect())
    }
}

#[async_trait]
impl BookSearch for BookSearchClient {
    async fn search_by_title(&self, title: &str, limit: u32) -> AppResult<Vec<BookSummary>> {
        Self::search_by_title(self, title, limit).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(endpoint: String, application_id: Option<&str>) -> BookSearchConfig {
        BookSearchConfig {
            endpoint,
            application_id: application_id.map(str::to_string),
            retries: 2,
            initial_backoff_ms: 1,
            timeout_secs: 5,
            default_hits: 10,
        }
    }

    #[tokio::test]
    async fn test_maps_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("applicationId", "app-123"))
            .and(query_param("format", "json"))
            .and(query_param("hits", "10"))
            .and(query_param("title", "Clean Code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Items": [
                    {"Item": {
                        "title": "Clean Code",
                        "isbn": "9780132350884",
                        "itemUrl": "http://example/1",
                        "smallImageUrl": "http://img/s.jpg",
                        "mediumImageUrl": "",
                        "largeImageUrl": "http://img/l.jpg"
                    }},
                    {"Item": {
                        "title": "Clean Architecture",
                        "isbn": "",
                        "isbnjan": "4912345678904",
                        "itemUrl": "http://example/2"
                    }}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BookSearchClient::new(&config(server.uri(), Some("app-123"))).unwrap();
        let books = client.search_by_title("Clean Code", 10).await.unwrap();

        assert_eq!(books.len(), 2);
        assert_eq!(
            books[0],
            BookSummary {
                title: "Clean Code".to_string(),
                isbn: Some("9780132350884".to_string()),
                item_url: Some("http://example/1".to_string()),
                thumbnail_url: Some("http://img/s.jpg".to_string()),
            }
        );
        assert_eq!(books[1].isbn.as_deref(), Some("4912345678904"));
        assert_eq!(books[1].thumbnail_url, None);
    }

    #[tokio::test]
    async fn test_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Items": []})))
            .mount(&server)
            .await;

        let client = BookSearchClient::new(&config(server.uri(), Some("app-123"))).unwrap();
        assert!(client.search_by_title("nothing", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_retried_then_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let client = BookSearchClient::new(&config(server.uri(), Some("app-123"))).unwrap();
        let err = client.search_by_title("Clean Code", 10).await.unwrap_err();

        match err {
            AppError::ExternalServiceUnavailable { message, cause } => {
                assert_eq!(message, UNAVAILABLE_MESSAGE);
                assert!(cause.contains("503"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.verify().await;
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Items": [{"Item": {"title": "Refactoring", "isbn": "9780134757599"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BookSearchClient::new(&config(server.uri(), Some("app-123"))).unwrap();
        let books = client.search_by_title("Refactoring", 10).await.unwrap();

        assert_eq!(books[0].title, "Refactoring");
        server.verify().await;
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("wrong_parameter"))
            .expect(1)
            .mount(&server)
            .await;

        let client = BookSearchClient::new(&config(server.uri(), Some("app-123"))).unwrap();
        let err = client.search_by_title("Clean Code", 10).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::UpstreamRejected { status: 400, ref message } if message == "wrong_parameter"
        ));
        server.verify().await;
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = BookSearchClient::new(&config(server.uri(), Some("  "))).unwrap();
        assert!(!client.is_configured());

        let err = client.search_by_title("Clean Code", 10).await.unwrap_err();
        assert!(matches!(err, AppError::NotConfigured(_)));
        server.verify().await;
    }

    #[tokio::test]
    async fn test_connection_error_exhausts_retries() {
        // Port 1 is reserved and refuses connections
        let client =
            BookSearchClient::new(&config("http://127.0.0.1:1".to_string(), Some("app-123")))
                .unwrap();
        let err = client.search_by_title("Clean Code", 10).await.unwrap_err();

        assert!(matches!(err, AppError::ExternalServiceUnavailable { .. }));
    }
}
