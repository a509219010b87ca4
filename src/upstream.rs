use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use crate::USER_ID_HEADER;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("error building the request, err: {0}")]
    InvalidRequest(String),

    #[error("error doing the request, err: {0}")]
    Transport(String),

    #[error("error reading the body, err: {0}")]
    Body(String),

    #[error("error executing request, status code: {0}")]
    Status(u16),
}

#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn fetch_message(&self, user_id: &str) -> Result<Vec<u8>, UpstreamError>;
}

pub struct HttpUpstreamClient {
    client: reqwest::Client,
    base_url: String,
    forward_user_id: bool, // attach the UserId header on outbound calls
}

impl HttpUpstreamClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            forward_user_id: false,
        })
    }

    pub fn forward_user_id(mut self, forward: bool) -> Self {
        self.forward_user_id = forward;
        self
    }

    fn message_url(&self, user_id: &str) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            error!(base_url = %self.base_url, "Invalid upstream url: {}", e);
            UpstreamError::InvalidRequest(e.to_string())
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                error!(base_url = %self.base_url, "Upstream url cannot be a base");
                UpstreamError::InvalidRequest(format!("{} cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .push("asshole")
            .push(user_id);
        Ok(url)
    }

    // body is only returned on 200
    pub async fn get(&self, url: &str, user_id: Option<&str>) -> Result<Vec<u8>, UpstreamError> {
        debug!(%url, "Starting upstream request");

        let mut builder = self.client.get(url).header(ACCEPT, "application/json");
        if let Some(id) = user_id {
            builder = builder.header(USER_ID_HEADER, id);
        }
        let request = builder.build().map_err(|e| {
            error!(%url, "Error creating request: {}", e);
            UpstreamError::InvalidRequest(e.to_string())
        })?;

        let response = self.client.execute(request).await.map_err(|e| {
            error!(%url, timeout = e.is_timeout(), "Error executing GET request: {}", e);
            UpstreamError::Transport(e.to_string())
        })?;

        // reading the body consumes the response, so the connection goes back to the pool
        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            error!(%url, "Error reading body: {}", e);
            UpstreamError::Body(e.to_string())
        })?;

        if status != StatusCode::OK {
            error!(%url, status = status.as_u16(), "Upstream status is different than OK");
            return Err(UpstreamError::Status(status.as_u16()));
        }

        debug!(%url, bytes = body.len(), "Finished upstream request");
        Ok(body.to_vec())
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn fetch_message(&self, user_id: &str) -> Result<Vec<u8>, UpstreamError> {
        let url = self.message_url(user_id)?;
        let header = self.forward_user_id.then_some(user_id);
        self.get(url.as_str(), header).await
    }
}
