use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::error::ApiError;

/// Thin JSON client for the hospital REST API.
///
/// Knows how to reach the backend and how to turn its failures into
/// [`ApiError`]s; it has no idea what the endpoints mean.
#[derive(Clone)]
pub struct HospitalApiClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HospitalApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_token: config.api_token.clone(),
        })
    }

    fn get_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::Unauthorized("auth token contains invalid characters".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            query: &[(&str, String)], body: Option<Value>)
                            -> Result<T, ApiError>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let headers = self.get_headers()?;

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if !query.is_empty() {
            req = req.query(query);
        }

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);
            return Err(ApiError::from_status(status.as_u16(), error_text));
        }

        response.json::<T>().await.map_err(transport_error)
    }

    pub async fn get<T>(&self, path: &str) -> Result<T, ApiError>
    where T: DeserializeOwned {
        self.request(Method::GET, path, &[], None).await
    }

    pub async fn get_with_query<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError>
    where T: DeserializeOwned {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post<T>(&self, path: &str, body: Value) -> Result<T, ApiError>
    where T: DeserializeOwned {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout(err.to_string())
    } else if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else if err.is_builder() {
        ApiError::InvalidUrl(err.to_string())
    } else {
        ApiError::Network(err.to_string())
    }
}
