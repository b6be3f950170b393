// Blog backend HTTP client

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::SavedBlog;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GenerateRequest {
    pub topic: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SaveRequest {
    pub topic: String,
    pub content: String,
}

/// Common response shape for every backend action.
///
/// The backend omits `success` on error responses, so a missing flag reads as false.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub blog_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogsResponse {
    #[serde(default)]
    pub blogs: Vec<SavedBlog>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Transport seam between the lifecycle controller and the backend.
///
/// Implementations return `Err` only when no usable JSON came back; a
/// server-side refusal is an `Ok` envelope with `success == false`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlogBackend: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<ApiEnvelope>;

    async fn save(&self, request: &SaveRequest) -> Result<ApiEnvelope>;

    async fn list_blogs(&self) -> Result<BlogsResponse>;

    async fn delete_blog(&self, id: i64) -> Result<ApiEnvelope>;
}

#[derive(Debug, Clone)]
pub struct BlogClient {
    base_url: String,
    client: Client,
}

impl BlogClient {
    pub fn new(base_url: &str, request_timeout: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Parse an envelope and fold the HTTP status into its success flag.
    async fn read_envelope(response: Response, what: &str) -> Result<ApiEnvelope> {
        let status = response.status();
        let mut envelope = response
            .json::<ApiEnvelope>()
            .await
            .with_context(|| format!("Failed to parse {what} response (status {status})"))?;

        if !status.is_success() {
            envelope.success = false;
        }

        Ok(envelope)
    }

    /// True when the backend answers its index route with a 2xx.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/", self.base_url);

        self.client
            .get(&url)
            .send()
            .await
            .is_ok_and(|response| response.status().is_success())
    }
}

#[async_trait]
impl BlogBackend for BlogClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<ApiEnvelope> {
        let url = format!("{}/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to send generate request")?;

        Self::read_envelope(response, "generate").await
    }

    async fn save(&self, request: &SaveRequest) -> Result<ApiEnvelope> {
        let url = format!("{}/save", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to send save request")?;

        Self::read_envelope(response, "save").await
    }

    async fn list_blogs(&self) -> Result<BlogsResponse> {
        let url = format!("{}/api/blogs", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send blogs request")?;

        let status = response.status();
        let mut result = response
            .json::<BlogsResponse>()
            .await
            .context("Failed to parse blogs response")?;

        if !status.is_success() && result.error.is_none() {
            result.error = Some(format!("Failed to list blogs: {status}"));
        }

        Ok(result)
    }

    async fn delete_blog(&self, id: i64) -> Result<ApiEnvelope> {
        let url = format!("{}/delete/{id}", self.base_url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .context("Failed to send delete request")?;

        Self::read_envelope(response, "delete").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_creation() {
        let client = BlogClient::new("http://localhost:5000/", 30);
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_envelope_missing_success_reads_false() {
        let envelope: ApiEnvelope =
            serde_json::from_str(r#"{"error":"Please provide a valid topic"}"#).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("Please provide a valid topic"));
    }

    #[tokio::test]
    async fn test_generate_posts_topic_as_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "topic": "Rust vs Go" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "topic": "Rust vs Go",
                "content": "# Intro\n\nRust is fast."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BlogClient::new(&server.uri(), 5).unwrap();
        let envelope = client
            .generate(&GenerateRequest {
                topic: "Rust vs Go".to_string(),
            })
            .await
            .unwrap();

        assert!(envelope.success);
        assert_eq!(envelope.content.as_deref(), Some("# Intro\n\nRust is fast."));
    }

    #[tokio::test]
    async fn test_server_error_status_keeps_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "error": "model unavailable" })),
            )
            .mount(&server)
            .await;

        let client = BlogClient::new(&server.uri(), 5).unwrap();
        let envelope = client
            .generate(&GenerateRequest {
                topic: "Rust vs Go".to_string(),
            })
            .await
            .unwrap();

        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("model unavailable"));
    }

    #[tokio::test]
    async fn test_error_status_overrides_success_flag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/save"))
            .respond_with(ResponseTemplate::new(502).set_body_json(json!({ "success": true })))
            .mount(&server)
            .await;

        let client = BlogClient::new(&server.uri(), 5).unwrap();
        let envelope = client
            .save(&SaveRequest {
                topic: "t".to_string(),
                content: "c".to_string(),
            })
            .await
            .unwrap();

        assert!(!envelope.success);
    }

    #[tokio::test]
    async fn test_non_json_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(
                ResponseTemplate::new(500).set_body_string("<html>Internal Server Error</html>"),
            )
            .mount(&server)
            .await;

        let client = BlogClient::new(&server.uri(), 5).unwrap();
        let result = client
            .generate(&GenerateRequest {
                topic: "Rust vs Go".to_string(),
            })
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_save_sends_topic_and_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/save"))
            .and(body_json(json!({ "topic": "Rust", "content": "Body" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "Blog saved successfully!",
                "blog_id": 12
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BlogClient::new(&server.uri(), 5).unwrap();
        let envelope = client
            .save(&SaveRequest {
                topic: "Rust".to_string(),
                content: "Body".to_string(),
            })
            .await
            .unwrap();

        assert!(envelope.success);
        assert_eq!(envelope.blog_id, Some(12));
    }

    #[tokio::test]
    async fn test_list_and_delete_blogs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/blogs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "blogs": [{
                    "id": 3,
                    "topic": "Ownership",
                    "content": "Borrowing rules",
                    "created_at": "2024-05-02 08:00:00",
                    "updated_at": "2024-05-02 08:00:00",
                    "preview": "Borrowing rules"
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/delete/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "Blog deleted successfully!"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BlogClient::new(&server.uri(), 5).unwrap();
        let listed = client.list_blogs().await.unwrap();
        assert_eq!(listed.blogs.len(), 1);
        assert_eq!(listed.blogs[0].topic, "Ownership");

        let deleted = client.delete_blog(3).await.unwrap();
        assert!(deleted.success);
    }

    #[tokio::test]
    async fn test_health_check_reports_unreachable_backend() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = BlogClient::new(&server.uri(), 5).unwrap();
        assert!(client.health_check().await);

        let offline = BlogClient::new("http://127.0.0.1:9", 1).unwrap();
        assert!(!offline.health_check().await);
    }
}
