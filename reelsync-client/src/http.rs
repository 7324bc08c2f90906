use std::time::Duration;

use reelsync_contracts::{ApiKey, ServiceError, ServiceResult};
use reelsync_model::ItemFilters;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

const AUTHORIZATION_HEADER: &str = "X-Emby-Authorization";
const TOKEN_HEADER: &str = "X-Emby-Token";

/// Connection settings shared by both adapters.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    pub client_name: String,
    pub device: String,
    pub device_id: String,
    pub version: String,
}

impl ClientConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout: Duration::from_secs(10),
            client_name: "reelsync".to_string(),
            device: "reelsync".to_string(),
            device_id: "reelsync".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Thin reqwest wrapper that knows the MediaBrowser header dialect and
/// maps failures onto [`ServiceError`].
#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    client: Client,
    base_url: String,
    authorization: String,
}

impl HttpClient {
    /// `scheme` is the authorization scheme the server expects
    /// (`MediaBrowser` or `Emby`); `base_path` is appended to the configured
    /// URL.
    pub(crate) fn new(
        config: &ClientConfig,
        scheme: &str,
        base_path: &str,
    ) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ServiceError::transport("client setup", err))?;

        let base_url = format!(
            "{}{}",
            config.url.as_str().trim_end_matches('/'),
            base_path
        );
        let authorization = format!(
            r#"{scheme} Client="{}", Device="{}", DeviceId="{}", Version="{}""#,
            config.client_name, config.device, config.device_id, config.version
        );

        Ok(Self {
            client,
            base_url,
            authorization,
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        key: Option<&ApiKey>,
    ) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "request");
        let builder = self
            .client
            .request(method, url)
            .header(AUTHORIZATION_HEADER, &self.authorization);
        match key {
            Some(key) => builder.header(TOKEN_HEADER, key.token()),
            None => builder,
        }
    }

    /// Send and accept only `200 OK` and `204 No Content`.
    pub(crate) async fn send(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> ServiceResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|err| ServiceError::transport(endpoint, err))?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(response),
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!(%endpoint, status = status.as_u16(), %body, "request failed");
                Err(ServiceError::Http {
                    endpoint: endpoint.to_string(),
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    pub(crate) async fn bytes(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> ServiceResult<Vec<u8>> {
        let response = self.send(endpoint, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ServiceError::transport(endpoint, err))?;
        Ok(bytes.to_vec())
    }

    pub(crate) async fn json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> ServiceResult<T> {
        let body = self.bytes(endpoint, request).await?;
        serde_json::from_slice(&body)
            .map_err(|err| ServiceError::decoding(endpoint, err))
    }

    pub(crate) async fn empty(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> ServiceResult<()> {
        self.send(endpoint, request).await.map(|_| ())
    }
}

/// Copy of `filters` that always asks for provider ids.
pub(crate) fn with_provider_ids(
    filters: &ItemFilters,
    fields_param: &str,
) -> ItemFilters {
    let mut query = filters.clone();
    let fields = query.entry(fields_param.to_string()).or_default();
    if !fields.split(',').any(|field| field.trim() == "ProviderIds") {
        if !fields.is_empty() {
            fields.push(',');
        }
        fields.push_str("ProviderIds");
    }
    query
}
