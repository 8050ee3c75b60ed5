use async_trait::async_trait;
use bookforge_core::book::{Book, BookFilter, BookSummary, UpdateBook};
use bookforge_core::preferences::{ReaderPreferences, UpdatePreferences};
use bookforge_genai::CoverImage;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, StatusCode};

use crate::{BookService, ForgeRequest, Gallery, ReadRequest, ReaderView, ServiceError};

/// HTTP client implementation of `BookService` for a running bookforge-server.
pub struct HttpService {
    base_url: String,
    client: Client,
    api_key: Option<String>,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            api_key: None,
        }
    }

    pub fn with_api_key(base_url: &str, key: String) -> Self {
        Self {
            api_key: Some(key),
            ..Self::new(base_url)
        }
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Check if the server is reachable. Not authenticated.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(self.url("/api/health"))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(format!("connection failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Internal(format!(
                "health check failed: {}",
                resp.status()
            )))
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ServiceError> {
        self.with_auth(builder)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ServiceError> {
        let resp = self.send(self.client.get(self.url(path)).query(query)).await?;
        handle_response(resp).await
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let resp = self.send(self.client.post(self.url(path)).json(body)).await?;
        handle_response(resp).await
    }

    async fn put_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let resp = self.send(self.client.put(self.url(path)).json(body)).await?;
        handle_response(resp).await
    }

    async fn delete_req(&self, path: &str) -> Result<(), ServiceError> {
        let resp = self.send(self.client.delete(self.url(path))).await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Internal(format!("json decode: {e}")))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error(resp: reqwest::Response) -> ServiceError {
    let status = resp.status();
    parse_error_with_status(status, resp).await
}

/// Map the server's `{"error": msg}` bodies back onto `ServiceError`.
async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or(body);

    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(msg),
        StatusCode::BAD_REQUEST => ServiceError::InvalidInput(msg),
        StatusCode::BAD_GATEWAY => ServiceError::Generation(msg),
        StatusCode::UNAUTHORIZED => ServiceError::Unauthorized(msg),
        _ => ServiceError::Internal(msg),
    }
}

fn filter_query(filter: &BookFilter) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(visibility) = filter.visibility {
        params.push(("visibility", visibility.as_str().to_string()));
    }
    if let Some(ref author) = filter.author {
        params.push(("author", author.clone()));
    }
    if let Some(limit) = filter.limit {
        params.push(("limit", limit.to_string()));
    }
    if let Some(offset) = filter.offset {
        params.push(("offset", offset.to_string()));
    }
    params
}

#[async_trait]
impl BookService for HttpService {
    async fn list_books(&self, filter: &BookFilter) -> Result<Vec<BookSummary>, ServiceError> {
        self.get_json("/api/books", &filter_query(filter)).await
    }

    async fn gallery(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Gallery, ServiceError> {
        let mut params = Vec::new();
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(offset) = offset {
            params.push(("offset", offset.to_string()));
        }
        self.get_json("/api/gallery", &params).await
    }

    async fn get_book(&self, id: &str) -> Result<Book, ServiceError> {
        self.get_json(&format!("/api/books/{id}"), &[]).await
    }

    async fn update_book(&self, id: &str, update: &UpdateBook) -> Result<Book, ServiceError> {
        self.put_json(&format!("/api/books/{id}"), update).await
    }

    async fn delete_book(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_req(&format!("/api/books/{id}")).await
    }

    async fn forge_book(&self, request: &ForgeRequest) -> Result<Book, ServiceError> {
        self.post_json("/api/books", request).await
    }

    async fn regenerate_cover(&self, id: &str) -> Result<Book, ServiceError> {
        self.post_json(&format!("/api/books/{id}/cover"), &serde_json::json!({}))
            .await
    }

    async fn cover(&self, id: &str) -> Result<CoverImage, ServiceError> {
        let resp = self
            .send(self.client.get(self.url(&format!("/api/books/{id}/cover"))))
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(parse_error_with_status(status, resp).await);
        }
        let mime_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ServiceError::Internal(format!("read body: {e}")))?;
        Ok(CoverImage { bytes, mime_type })
    }

    async fn read_page(
        &self,
        id: &str,
        request: &ReadRequest,
    ) -> Result<ReaderView, ServiceError> {
        let mut params = vec![("page", request.page.to_string())];
        if let Some(wpp) = request.words_per_page {
            params.push(("words_per_page", wpp.to_string()));
        }
        if let Some(ref reader) = request.reader_id {
            params.push(("reader", reader.clone()));
        }
        self.get_json(&format!("/api/books/{id}/pages"), &params).await
    }

    async fn get_preferences(&self, reader_id: &str) -> Result<ReaderPreferences, ServiceError> {
        self.get_json(&format!("/api/readers/{reader_id}/preferences"), &[])
            .await
    }

    async fn update_preferences(
        &self,
        reader_id: &str,
        update: &UpdatePreferences,
    ) -> Result<ReaderPreferences, ServiceError> {
        self.put_json(&format!("/api/readers/{reader_id}/preferences"), update)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookforge_core::book::Visibility;

    #[test]
    fn filter_query_includes_set_fields_only() {
        let params = filter_query(&BookFilter {
            visibility: Some(Visibility::Public),
            author: Some("Ana María".into()),
            limit: Some(5),
            offset: None,
        });
        assert_eq!(
            params,
            vec![
                ("visibility", "public".to_string()),
                ("author", "Ana María".to_string()),
                ("limit", "5".to_string()),
            ]
        );
        assert!(filter_query(&BookFilter::default()).is_empty());
    }

    #[test]
    fn base_url_is_normalized() {
        let svc = HttpService::new("http://localhost:3710/");
        assert_eq!(svc.url("/api/health"), "http://localhost:3710/api/health");
    }
}
