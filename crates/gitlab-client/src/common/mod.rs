//! Common utilities for the GitLab API client
//!
//! Provides the authenticated HTTP wrapper shared by all API operations.

use crate::error::GitLabError;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Header GitLab reads personal/project access tokens from
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// HTTP client wrapper with authentication
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: String, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full REST v4 URL from a path such as `/projects/1/variables`
    pub fn build_url(&self, path: &str) -> String {
        format!("{}/api/v4{}", self.base_url, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(TOKEN_HEADER, &self.token)
            .header("Accept", "application/json")
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GitLabError> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let response = self.request(Method::GET, &url).query(query).send().await?;
        let response = check_status(Method::GET, &url, response).await?;
        Ok(response.json().await?)
    }

    /// Make a POST request with a JSON body
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GitLabError> {
        let url = self.build_url(path);
        debug!("POST {}", url);

        let response = self.request(Method::POST, &url).json(body).send().await?;
        let response = check_status(Method::POST, &url, response).await?;
        Ok(response.json().await?)
    }

    /// Make a PUT request with a JSON body
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GitLabError> {
        let url = self.build_url(path);
        debug!("PUT {}", url);

        let response = self.request(Method::PUT, &url).json(body).send().await?;
        let response = check_status(Method::PUT, &url, response).await?;
        Ok(response.json().await?)
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str, query: &[(&str, &str)]) -> Result<(), GitLabError> {
        let url = self.build_url(path);
        debug!("DELETE {}", url);

        let response = self.request(Method::DELETE, &url).query(query).send().await?;
        check_status(Method::DELETE, &url, response).await?;
        Ok(())
    }
}

/// Turn a non-success response into `GitLabError::Response`
async fn check_status(method: Method, url: &str, response: Response) -> Result<Response, GitLabError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(GitLabError::Response {
        method: method.to_string(),
        url: url.to_string(),
        status: status.as_u16(),
        message: parse_error_message(&body),
    })
}

/// Extract GitLab's error text from a response body.
///
/// GitLab reports errors as `{"message": "..."}`, `{"message": {field: [..]}}`
/// or `{"error": "..."}`. Anything else is returned as-is.
pub fn parse_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    match value.get("message").or_else(|| value.get("error")) {
        Some(serde_json::Value::String(message)) => message.clone(),
        Some(other) => other.to_string(),
        None => body.trim().to_string(),
    }
}

/// Percent-encode a single path segment (project path, variable key)
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
