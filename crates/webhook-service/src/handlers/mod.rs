//! HTTP 请求处理器模块

pub mod health;
pub mod webhook;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::WebhookError;

/// 统一响应体 `{status, message}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub status: String,
    pub message: String,
}

impl ApiMessage {
    pub fn success(message: impl Into<String>) -> Self {
        let message = message.into();
        info!("{}", message);

        Self {
            status: "success".to_string(),
            message,
        }
    }
}

/// 未知路径或方法
pub async fn invalid_url() -> WebhookError {
    WebhookError::InvalidUrl
}
