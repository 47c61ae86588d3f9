//! REST client for a node's configuration endpoint.

use std::time::Duration;

use reqwest::{header, StatusCode};
use thiserror::Error;
use url::Url;

use crate::client::NodeEndpoint;
use crate::http::CONF_URL;
use crate::presentation::{ConvertError, FormatConverter, HoconConverter, JsonConverter};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Connection issues while trying to send http request")]
    Connection(#[source] reqwest::Error),

    #[error("Http error code: {status}\nError message: {body}")]
    Http { status: u16, body: String },

    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Malformed(#[from] ConvertError),
}

pub struct ConfigurationClient {
    http: reqwest::Client,
}

impl ConfigurationClient {
    pub fn new() -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .no_proxy()
            .build()
            .map_err(ClientError::Connection)?;
        Ok(Self { http })
    }

    /// Fetch the node's whole configuration as pretty JSON.
    pub async fn get(&self, endpoint: &NodeEndpoint) -> Result<String, ClientError> {
        let response = self
            .http
            .get(configuration_url(endpoint)?)
            .send()
            .await
            .map_err(ClientError::Connection)?;

        let body = read_success(response).await?;
        let parsed: serde_json::Value = serde_json::from_str(&body).map_err(ConvertError::from)?;
        Ok(serde_json::to_string_pretty(&parsed).map_err(ConvertError::from)?)
    }

    /// Submit a HOCON change to the node. Returns an empty string on success.
    pub async fn set(&self, endpoint: &NodeEndpoint, hocon: &str) -> Result<String, ClientError> {
        let raw = HoconConverter::new().convert_from(hocon)?;
        let body = JsonConverter::new().convert_to(&raw);

        let response = self
            .http
            .post(configuration_url(endpoint)?)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(ClientError::Connection)?;

        read_success(response).await?;
        Ok(String::new())
    }
}

fn configuration_url(endpoint: &NodeEndpoint) -> Result<Url, ClientError> {
    Ok(endpoint.base_url()?.join(&format!("{}/", CONF_URL.trim_start_matches('/')))?)
}

async fn read_success(response: reqwest::Response) -> Result<String, ClientError> {
    let status = response.status();
    let body = response.text().await.map_err(ClientError::Connection)?;
    if status == StatusCode::OK {
        Ok(body)
    } else {
        Err(ClientError::Http {
            status: status.as_u16(),
            body,
        })
    }
}
