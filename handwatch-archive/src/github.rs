//! Document store backed by the GitHub contents API.
//!
//! Each document is a file in a repository. Reads return the file's blob
//! `sha`, and the API refuses an update whose `sha` is not the file's current
//! one, which gives the store its optimistic concurrency.
//!
//! ## Example
//!
//! ```rust,no_run
//! use handwatch_archive::github::GithubStore;
//! use handwatch_archive::DocumentStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = GithubStore::builder()
//!         .repo("lab/glove-readings")
//!         .token(std::env::var("GITHUB_TOKEN")?)
//!         .build()?;
//!
//!     if let Some(document) = store.read("sensor_data.json").await? {
//!         println!("{} bytes at {}", document.content.len(), document.sha);
//!     }
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{ArchiveError, Document, DocumentStore};

/// Public GitHub API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const API_VERSION: &str = "2022-11-28";

/// Documents stored as files in a GitHub repository.
#[derive(Debug, Clone)]
pub struct GithubStore {
    client: Client,
    api_url: String,
    repo: String,
    token: Option<String>,
    branch: Option<String>,
}

impl GithubStore {
    /// Create a new builder for configuring the store.
    pub fn builder() -> GithubStoreBuilder {
        GithubStoreBuilder::default()
    }

    /// Repository in `owner/name` form.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_url,
            self.repo,
            path.trim_start_matches('/')
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn put(&self, path: &str, body: PutRequest<'_>) -> Result<(), ArchiveError> {
        let response = self
            .authorize(self.client.put(self.contents_url(path)))
            .json(&body)
            .send()
            .await?;
        check_status(response, path)?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for GithubStore {
    async fn read(&self, path: &str) -> Result<Option<Document>, ArchiveError> {
        let mut request = self.client.get(self.contents_url(path));
        if let Some(branch) = &self.branch {
            request = request.query(&[("ref", branch)]);
        }

        let response = self.authorize(request).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let file: ContentResponse = check_status(response, path)?
            .json()
            .await
            .map_err(|e| ArchiveError::Parse(e.to_string()))?;

        Ok(Some(Document {
            content: decode_content(&file)?,
            sha: file.sha,
        }))
    }

    async fn create(&self, path: &str, content: &str, message: &str) -> Result<(), ArchiveError> {
        let body = PutRequest {
            message,
            content: STANDARD.encode(content),
            sha: None,
            branch: self.branch.as_deref(),
        };
        self.put(path, body).await
    }

    async fn update(
        &self,
        path: &str,
        content: &str,
        sha: &str,
        message: &str,
    ) -> Result<(), ArchiveError> {
        let body = PutRequest {
            message,
            content: STANDARD.encode(content),
            sha: Some(sha),
            branch: self.branch.as_deref(),
        };
        self.put(path, body).await
    }
}

fn check_status(response: Response, path: &str) -> Result<Response, ArchiveError> {
    let status = response.status();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ArchiveError::Auth(format!(
            "access to {} denied ({})",
            path, status
        ))),
        StatusCode::NOT_FOUND => Err(ArchiveError::NotFound(path.to_string())),
        // 409: sha mismatch, 422: file exists but no sha was given
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            Err(ArchiveError::Conflict(format!("{} ({})", path, status)))
        }
        status if !status.is_success() => Err(ArchiveError::Http(format!(
            "API returned status {}",
            status
        ))),
        _ => Ok(response),
    }
}

fn decode_content(file: &ContentResponse) -> Result<String, ArchiveError> {
    if file.encoding.as_deref() == Some("none") {
        return Err(ArchiveError::Parse(
            "file is too large for the contents API".to_string(),
        ));
    }

    // The API wraps base64 at 60 columns
    let packed: String = file
        .content
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(packed)
        .map_err(|e| ArchiveError::Parse(format!("invalid base64 content: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ArchiveError::Parse(format!("content is not UTF-8: {}", e)))
}

/// Builder for [`GithubStore`].
#[derive(Debug, Default)]
pub struct GithubStoreBuilder {
    api_url: Option<String>,
    repo: Option<String>,
    token: Option<String>,
    branch: Option<String>,
    timeout: Option<Duration>,
}

impl GithubStoreBuilder {
    /// Repository in `owner/name` form (required).
    pub fn repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    /// Access token. Public repositories can be read without one.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// API base URL, for GitHub Enterprise.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Branch to read and write. Defaults to the repository's default branch.
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the store.
    pub fn build(self) -> Result<GithubStore, ArchiveError> {
        let repo = self
            .repo
            .filter(|repo| !repo.is_empty())
            .ok_or_else(|| ArchiveError::Connection("no repository configured".to_string()))?;

        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .user_agent(concat!("handwatch-archive/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ArchiveError::Connection(e.to_string()))?;

        Ok(GithubStore {
            client,
            api_url: self
                .api_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            repo,
            token: self.token.filter(|token| !token.is_empty()),
            branch: self.branch,
        })
    }
}

// GitHub API response types

#[derive(Debug, Deserialize)]
struct ContentResponse {
    sha: String,
    content: Option<String>,
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serve one canned response per connection and hand back each request
    /// as text.
    fn serve(responses: Vec<(&'static str, String)>) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for (status, body) in responses {
                let (stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream);

                let mut request = String::new();
                let mut content_length = 0;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();
                    if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                        content_length = value.trim().parse().unwrap();
                    }
                    let end = line == "\r\n";
                    request.push_str(&line);
                    if end {
                        break;
                    }
                }
                let mut body_bytes = vec![0u8; content_length];
                reader.read_exact(&mut body_bytes).unwrap();
                request.push_str(&String::from_utf8(body_bytes).unwrap());
                tx.send(request).unwrap();

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                reader.get_mut().write_all(response.as_bytes()).unwrap();
            }
        });

        (format!("http://{}", addr), rx)
    }

    fn store(api_url: &str) -> GithubStore {
        GithubStore::builder()
            .api_url(api_url)
            .repo("lab/glove")
            .token("secret")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_repo() {
        assert!(GithubStore::builder().build().is_err());
        assert!(GithubStore::builder().repo("").build().is_err());
    }

    #[test]
    fn test_contents_url() {
        let store = store("https://github.example.com/api/v3/");
        assert_eq!(store.repo(), "lab/glove");
        assert_eq!(
            store.contents_url("archive/Data_2024-03-01.json"),
            "https://github.example.com/api/v3/repos/lab/glove/contents/archive/Data_2024-03-01.json"
        );
    }

    #[test]
    fn test_decode_wrapped_content() {
        let file = ContentResponse {
            sha: "abc".to_string(),
            content: Some("W3siaWQi\nOiAxfV0=\n".to_string()),
            encoding: Some("base64".to_string()),
        };
        assert_eq!(decode_content(&file).unwrap(), "[{\"id\": 1}]");
    }

    #[test]
    fn test_decode_rejects_oversized_file() {
        let file = ContentResponse {
            sha: "abc".to_string(),
            content: Some(String::new()),
            encoding: Some("none".to_string()),
        };
        assert!(matches!(decode_content(&file), Err(ArchiveError::Parse(_))));
    }

    #[tokio::test]
    async fn test_read_document() {
        let body = format!(
            r#"{{"type": "file", "sha": "3d21ec5", "encoding": "base64", "content": "{}"}}"#,
            STANDARD.encode("[]")
        );
        let (url, requests) = serve(vec![("200 OK", body)]);

        let document = store(&url).read("sensor_data.json").await.unwrap().unwrap();
        assert_eq!(document.content, "[]");
        assert_eq!(document.sha, "3d21ec5");

        let request = requests.recv().unwrap();
        assert!(request.starts_with("GET /repos/lab/glove/contents/sensor_data.json"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer secret"));
    }

    #[tokio::test]
    async fn test_read_missing_document() {
        let (url, _requests) = serve(vec![("404 Not Found", r#"{"message": "Not Found"}"#.to_string())]);
        assert_eq!(store(&url).read("sensor_data.json").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_unauthorized() {
        let (url, _requests) = serve(vec![(
            "401 Unauthorized",
            r#"{"message": "Bad credentials"}"#.to_string(),
        )]);
        assert!(matches!(
            store(&url).read("sensor_data.json").await,
            Err(ArchiveError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_update_sends_sha_and_base64() {
        let (url, requests) = serve(vec![("200 OK", r#"{"content": {}}"#.to_string())]);

        store(&url)
            .update("sensor_data.json", "[]", "3d21ec5", "Reset")
            .await
            .unwrap();

        let request = requests.recv().unwrap();
        assert!(request.starts_with("PUT /repos/lab/glove/contents/sensor_data.json"));
        assert!(request.contains(r#""sha":"3d21ec5""#));
        assert!(request.contains(&format!(r#""content":"{}""#, STANDARD.encode("[]"))));
    }

    #[tokio::test]
    async fn test_stale_update_conflicts() {
        let (url, _requests) = serve(vec![("409 Conflict", r#"{"message": "sha mismatch"}"#.to_string())]);
        assert!(matches!(
            store(&url).update("sensor_data.json", "[]", "old", "Reset").await,
            Err(ArchiveError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_create_existing_conflicts() {
        let (url, requests) = serve(vec![(
            "422 Unprocessable Entity",
            r#"{"message": "sha wasn't supplied"}"#.to_string(),
        )]);
        assert!(matches!(
            store(&url).create("archive/Data_2024-03-01.json", "[]", "Archive").await,
            Err(ArchiveError::Conflict(_))
        ));
        assert!(!requests.recv().unwrap().contains("\"sha\""));
    }
}
