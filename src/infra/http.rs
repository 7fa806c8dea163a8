use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, header::ACCEPT};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// JSON transport bound to one backend base URL.
pub struct HttpClient {
    http: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> AppResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let request = self.request(Method::GET, path);
        Self::execute(request).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path).json(body);
        Self::execute(request).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.endpoint(path);
        debug!(%method, %url, "sending request");
        self.http
            .request(method, url)
            .header(ACCEPT, "application/json")
    }

    async fn execute<T: DeserializeOwned>(request: RequestBuilder) -> AppResult<T> {
        let response = request
            .send()
            .await
            .map_err(|err| AppError::transport(format!("failed to reach backend: {err}")))?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "received response");

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(classify_failure(status, body));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| AppError::transport(format!("failed to parse backend response: {err}")))
    }
}

fn classify_failure(status: StatusCode, body: String) -> AppError {
    let body = body.trim();
    let message = if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string()
    } else {
        body.to_string()
    };

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => AppError::Validation(message),
        _ => AppError::http_status(status.as_u16(), message),
    }
}
