//! HTTP Management API Client
//!
//! reqwest-based implementation of [`RemoteResourceApi`] for the provider's `/api/v2`
//! endpoints. HTTP 429 is reported as [`RemoteError::RateLimited`] so the store's retry
//! policy can act on it.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::wire::{
    ClientCreateRequest, ClientGrantCreateRequest, ClientGrantUpdateRequest, ClientGrantWire,
    ClientUpdateRequest, ClientWire, ResourceServerCreateRequest, ResourceServerUpdateRequest,
    ResourceServerWire, UserCreateRequest, UserUpdateRequest, UserWire,
};
use super::{RemoteResourceApi, RemoteSecretRotation, WirePage};
use crate::error::{ConfigurationError, RemoteError, RemoteResult};
use crate::filter::ListQuery;
use crate::types::{IdentityProviderConfig, PageRequest};

pub type UserResourceApi = HttpResourceApi<UserWire, UserCreateRequest, UserUpdateRequest>;
pub type ApplicationResourceApi =
    HttpResourceApi<ClientWire, ClientCreateRequest, ClientUpdateRequest>;
pub type GrantResourceApi =
    HttpResourceApi<ClientGrantWire, ClientGrantCreateRequest, ClientGrantUpdateRequest>;
pub type ApiResourceApi =
    HttpResourceApi<ResourceServerWire, ResourceServerCreateRequest, ResourceServerUpdateRequest>;

struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
}

/// Management API client. Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ManagementApiClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for ManagementApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagementApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish()
    }
}

impl ManagementApiClient {
    /// Create a client for the configured tenant.
    pub fn new(config: &IdentityProviderConfig) -> Result<Self, ConfigurationError> {
        Self::with_base_url(config.management_url(), config.timeout)
    }

    /// Create a client rooted at an explicit management API URL.
    pub fn with_base_url(mut base_url: Url, timeout: Duration) -> Result<Self, ConfigurationError> {
        if base_url.cannot_be_a_base() {
            return Err(ConfigurationError::InvalidEndpoint {
                url: base_url.to_string(),
            });
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigurationError::InvalidValue {
                field: "http_client",
                message: e.to_string(),
            })?;

        Ok(Self {
            inner: Arc::new(ClientInner { http, base_url }),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn users(&self) -> UserResourceApi {
        HttpResourceApi::new(self.clone(), "users", "users")
    }

    pub fn applications(&self) -> ApplicationResourceApi {
        HttpResourceApi::new(self.clone(), "clients", "clients")
    }

    pub fn grants(&self) -> GrantResourceApi {
        HttpResourceApi::new(self.clone(), "client-grants", "client_grants")
    }

    pub fn apis(&self) -> ApiResourceApi {
        HttpResourceApi::new(self.clone(), "resource-servers", "resource_servers")
    }

    fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    fn url(&self, collection: &str, segments: &[&str]) -> RemoteResult<Url> {
        let mut url = self
            .inner
            .base_url
            .join(collection)
            .map_err(|e| RemoteError::Transport {
                message: format!("invalid URL for {collection}: {e}"),
            })?;

        if !segments.is_empty() {
            let mut path = url.path_segments_mut().map_err(|_| RemoteError::Transport {
                message: format!("cannot append path segments to {collection}"),
            })?;
            path.extend(segments);
        }

        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, token: &SecretString) -> RemoteResult<Response> {
        let response = request
            .bearer_auth(token.expose_secret())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| RemoteError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RemoteError::RateLimited {
                retry_after: parse_retry_after(response.headers()),
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::Api {
            status: status.as_u16(),
            message: error_message(&body, status),
        })
    }
}

/// Generic CRUD endpoint for one resource collection.
pub struct HttpResourceApi<W, C, U> {
    client: ManagementApiClient,
    collection: &'static str,
    list_field: &'static str,
    _types: PhantomData<fn() -> (W, C, U)>,
}

impl<W, C, U> HttpResourceApi<W, C, U> {
    fn new(
        client: ManagementApiClient,
        collection: &'static str,
        list_field: &'static str,
    ) -> Self {
        Self {
            client,
            collection,
            list_field,
            _types: PhantomData,
        }
    }

    /// Collection path relative to the management API root.
    pub fn collection(&self) -> &'static str {
        self.collection
    }
}

impl<W, C, U> Clone for HttpResourceApi<W, C, U> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone(), self.collection, self.list_field)
    }
}

#[async_trait]
impl<W, C, U> RemoteResourceApi for HttpResourceApi<W, C, U>
where
    W: DeserializeOwned + Send + 'static,
    C: Serialize + Send + Sync + 'static,
    U: Serialize + Send + Sync + 'static,
{
    type Wire = W;
    type CreateRequest = C;
    type UpdateRequest = U;

    async fn get(&self, token: &SecretString, id: &str) -> RemoteResult<W> {
        let url = self.client.url(self.collection, &[id])?;
        let response = self.client.send(self.client.http().get(url), token).await?;
        decode(response).await
    }

    async fn list(
        &self,
        token: &SecretString,
        query: &ListQuery,
        page: PageRequest,
    ) -> RemoteResult<WirePage<W>> {
        let mut url = self.client.url(self.collection, &[])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &page.index.to_string());
            pairs.append_pair("per_page", &page.size.to_string());
            pairs.append_pair("include_totals", "true");
            if let Some(search) = &query.search {
                pairs.append_pair("q", search);
            }
            for (name, value) in &query.params {
                pairs.append_pair(name, value);
            }
        }

        let response = self.client.send(self.client.http().get(url), token).await?;
        let body: Value = decode(response).await?;
        parse_list(body, self.list_field)
    }

    async fn create(&self, token: &SecretString, request: &C) -> RemoteResult<W> {
        let url = self.client.url(self.collection, &[])?;
        let response = self
            .client
            .send(self.client.http().post(url).json(request), token)
            .await?;
        decode(response).await
    }

    async fn update(&self, token: &SecretString, id: &str, request: &U) -> RemoteResult<()> {
        let url = self.client.url(self.collection, &[id])?;
        self.client
            .send(self.client.http().patch(url).json(request), token)
            .await?;
        Ok(())
    }

    async fn delete(&self, token: &SecretString, id: &str) -> RemoteResult<()> {
        let url = self.client.url(self.collection, &[id])?;
        match self.client.send(self.client.http().delete(url), token).await {
            Ok(_) | Err(RemoteError::Api { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl RemoteSecretRotation for ApplicationResourceApi {
    async fn rotate_secret(&self, token: &SecretString, id: &str) -> RemoteResult<ClientWire> {
        let url = self.client.url(self.collection, &[id, "rotate-secret"])?;
        let response = self.client.send(self.client.http().post(url), token).await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| RemoteError::InvalidResponse {
            message: e.to_string(),
        })
}

fn parse_list<W: DeserializeOwned>(body: Value, list_field: &str) -> RemoteResult<WirePage<W>> {
    // Lists are always requested with include_totals; a reply without a total can't be paged.
    let mut map = match body {
        Value::Object(map) => map,
        other => {
            return Err(RemoteError::InvalidResponse {
                message: format!("expected a list object with totals, got: {other}"),
            })
        }
    };

    let items = map
        .remove(list_field)
        .ok_or_else(|| RemoteError::InvalidResponse {
            message: format!("missing '{list_field}' in list response"),
        })?;
    let total = map
        .get("total")
        .and_then(Value::as_u64)
        .ok_or_else(|| RemoteError::InvalidResponse {
            message: "missing 'total' in list response".to_string(),
        })?;

    let items: Vec<W> = serde_json::from_value(items).map_err(|e| RemoteError::InvalidResponse {
        message: e.to_string(),
    })?;

    Ok(WirePage { items, total })
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
    };

    if let Some(seconds) = header("retry-after") {
        return u64::try_from(seconds).ok().map(Duration::from_secs);
    }

    let reset_at = header("x-ratelimit-reset")?;
    let remaining = reset_at - chrono::Utc::now().timestamp();
    u64::try_from(remaining).ok().map(Duration::from_secs)
}

fn error_message(body: &str, status: StatusCode) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    field("message")
        .or_else(|| field("error"))
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_parse_list_with_totals() {
        let body = serde_json::json!({
            "start": 0,
            "limit": 1,
            "total": 3,
            "client_grants": [{ "id": "cgr_1", "client_id": "c", "audience": "a", "scope": [] }]
        });

        let page: WirePage<ClientGrantWire> = parse_list(body, "client_grants").unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items[0].id, "cgr_1");
    }

    #[test]
    fn test_parse_list_without_total_is_invalid() {
        let bare = serde_json::json!([{ "id": "cgr_1", "client_id": "c", "audience": "a" }]);
        let result: RemoteResult<WirePage<ClientGrantWire>> = parse_list(bare, "client_grants");
        assert!(matches!(result, Err(RemoteError::InvalidResponse { .. })));

        let no_total = serde_json::json!({
            "client_grants": [{ "id": "cgr_1", "client_id": "c", "audience": "a" }]
        });
        let result: RemoteResult<WirePage<ClientGrantWire>> = parse_list(no_total, "client_grants");
        match result {
            Err(RemoteError::InvalidResponse { message }) => assert!(message.contains("total")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_missing_field() {
        let body = serde_json::json!({ "total": 0 });
        let result: RemoteResult<WirePage<UserWire>> = parse_list(body, "users");
        assert!(matches!(result, Err(RemoteError::InvalidResponse { .. })));
    }

    #[test]
    fn test_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("3"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_retry_after_missing() {
        assert_eq!(parse_retry_after(&HeaderMap::new()), None);
    }

    #[test]
    fn test_error_message_prefers_json_message() {
        let body =
            r#"{"statusCode":400,"error":"Bad Request","message":"Payload validation error"}"#;
        assert_eq!(
            error_message(body, StatusCode::BAD_REQUEST),
            "Payload validation error"
        );
        assert_eq!(error_message("", StatusCode::NOT_FOUND), "Not Found");
    }

    #[test]
    fn test_url_encodes_ids() {
        let client = ManagementApiClient::with_base_url(
            Url::parse("https://tenant.example.com/api/v2").unwrap(),
            Duration::from_secs(5),
        )
        .unwrap();

        let url = client.url("users", &["auth0|a b/c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://tenant.example.com/api/v2/users/auth0|a%20b%2Fc"
        );
    }
}
