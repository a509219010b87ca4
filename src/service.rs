use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::models::Message;
use crate::upstream::{UpstreamClient, UpstreamError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("error unmarshaling the body, err: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait MessageService: Send + Sync {
    async fn get_message(&self, user_id: &str) -> Result<Message, ServiceError>;
}

pub struct FoaasMessageService {
    upstream: Arc<dyn UpstreamClient>,
}

impl FoaasMessageService {
    pub fn new(upstream: Arc<dyn UpstreamClient>) -> Self {
        Self { upstream }
    }
}

#[async_trait]
impl MessageService for FoaasMessageService {
    async fn get_message(&self, user_id: &str) -> Result<Message, ServiceError> {
        let body = self.upstream.fetch_message(user_id).await?;

        serde_json::from_slice(&body).map_err(|e| {
            error!(%user_id, "Error unmarshaling the response: {}", e);
            ServiceError::Decode(e)
        })
    }
}
