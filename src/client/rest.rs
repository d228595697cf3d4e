use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_RANGE, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::{Backend, BackendError, BackendHandle, ClientSettings, Connector, Query, Table, UploadOptions};

const PREFER: &str = "Prefer";

/// Connector that builds a [`RestBackend`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RestConnector;

impl Connector for RestConnector {
    fn connect(&self, settings: &ClientSettings) -> Result<BackendHandle, BackendError> {
        Ok(Arc::new(RestBackend::new(settings)?))
    }
}

/// Talks to the hosted service: `/rest/v1` for rows, `/storage/v1` for files.
pub struct RestBackend {
    http: reqwest::Client,
    base: Url,
    bucket: String,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    msg: Option<String>,
}

impl RestBackend {
    pub fn new(settings: &ClientSettings) -> Result<Self, BackendError> {
        if settings.access_key.is_empty() {
            return Err(BackendError::Unavailable("no access key configured".to_string()));
        }

        let mut base = Url::parse(&settings.endpoint)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&settings.access_key)
            .map_err(|e| BackendError::Unavailable(format!("access key is not a valid header: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", settings.access_key))
            .map_err(|e| BackendError::Unavailable(format!("access key is not a valid header: {}", e)))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base,
            bucket: settings.bucket.clone(),
        })
    }

    fn rows_url(&self, table: Table) -> Result<Url, BackendError> {
        Ok(self.base.join(&format!("rest/v1/{}", table.name()))?)
    }

    fn rows_request(&self, method: Method, query: &Query) -> Result<RequestBuilder, BackendError> {
        let url = self.rows_url(query.table)?;
        log::debug!("{} {} {:?}", method, url, query.to_params());
        Ok(self.http.request(method, url))
    }

    fn filter_params(query: &Query) -> Vec<(String, String)> {
        query
            .filters
            .iter()
            .map(|f| (f.column.clone(), format!("eq.{}", f.value)))
            .collect()
    }

    async fn rows(response: Response) -> Result<Vec<Value>, BackendError> {
        let body = Self::check(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Turns a non-2xx response into [`BackendError::Rejected`] carrying the service's message.
    async fn check(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
        let message = parsed
            .message
            .or(parsed.error)
            .or(parsed.msg)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request rejected").to_string());
        Err(BackendError::rejected(status.as_u16(), message))
    }
}

/// Reads the total out of a `Content-Range` header such as `0-19/45` or `*/45`.
/// An absent or unknown total counts as zero.
pub fn parse_total(content_range: Option<&str>) -> u64 {
    content_range
        .and_then(|range| range.rsplit('/').next())
        .and_then(|total| total.trim().parse().ok())
        .unwrap_or(0)
}

#[async_trait]
impl Backend for RestBackend {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, BackendError> {
        let response = self
            .rows_request(Method::GET, query)?
            .query(&query.to_params())
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn count(&self, query: &Query) -> Result<u64, BackendError> {
        let count_query = query.count_only();
        let response = self
            .rows_request(Method::HEAD, &count_query)?
            .query(&count_query.to_params())
            .header(PREFER, "count=exact")
            .send()
            .await?;
        let response = Self::check(response).await?;
        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok());
        Ok(parse_total(range))
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, BackendError> {
        let url = self.rows_url(table)?;
        log::debug!("POST {}", url);
        let response = self
            .http
            .post(url)
            .query(&[("select", "*")])
            .header(PREFER, "return=representation")
            .json(&vec![row])
            .send()
            .await?;
        let mut rows = Self::rows(response).await?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            n => Err(BackendError::RowCount(n)),
        }
    }

    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, BackendError> {
        let mut params = Self::filter_params(query);
        params.push(("select".to_owned(), "*".to_owned()));
        let response = self
            .rows_request(Method::PATCH, query)?
            .query(&params)
            .header(PREFER, "return=representation")
            .json(&patch)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn delete(&self, query: &Query) -> Result<(), BackendError> {
        let response = self
            .rows_request(Method::DELETE, query)?
            .query(&Self::filter_params(query))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>, options: &UploadOptions) -> Result<(), BackendError> {
        let url = self.base.join(&format!("storage/v1/object/{}/{}", self.bucket, path))?;
        log::debug!("POST {} ({} bytes)", url, bytes.len());
        let content_type = options
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let mut request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", options.upsert.to_string())
            .body(bytes);
        if let Some(secs) = options.cache_control_secs {
            request = request.header(CACHE_CONTROL, format!("max-age={}", secs));
        }
        Self::check(request.send().await?).await?;
        Ok(())
    }

    async fn remove(&self, paths: &[String]) -> Result<(), BackendError> {
        let url = self.base.join(&format!("storage/v1/object/{}", self.bucket))?;
        log::debug!("DELETE {} {:?}", url, paths);
        let response = self
            .http
            .delete(url)
            .json(&json!({ "prefixes": paths }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}storage/v1/object/public/{}/{}", self.base, self.bucket, path)
    }
}
