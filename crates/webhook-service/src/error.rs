//! Webhook 服务错误类型定义

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Webhook 服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    // 入站请求错误
    #[error("Invalid URL. Use the /webhook endpoint")]
    InvalidUrl,
    #[error("Invalid webhook structure. Ensure 'media' and 'request' objects are present")]
    InvalidStructure,
    #[error("{0}")]
    InvalidPayload(String),
    #[error("webhook request has no request_id")]
    MissingRequestId,

    // 媒体服务器错误
    #[error("could not retrieve data from Overseerr: {status} {reason}")]
    MediaServer { status: u16, reason: String },
    #[error("{action} rejected by Overseerr: {status} {reason}")]
    Rejected {
        action: &'static str,
        status: u16,
        reason: String,
    },
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl WebhookError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidUrl | Self::InvalidStructure => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "INVALID_URL",
            Self::InvalidStructure => "INVALID_STRUCTURE",
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::MissingRequestId => "MISSING_REQUEST_ID",
            Self::MediaServer { .. } => "MEDIA_SERVER_ERROR",
            Self::Rejected { .. } => "REQUEST_REJECTED",
            Self::Http(_) => "HTTP_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 响应体中的消息；处理阶段的错误统一加前缀
    pub fn response_message(&self) -> String {
        match self {
            Self::InvalidUrl | Self::InvalidStructure => self.to_string(),
            other => format!("Error processing webhook: {}", other),
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.response_message();

        tracing::error!(code = self.error_code(), "{}", message);

        let body = json!({
            "status": "error",
            "message": message
        });

        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for WebhookError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(err.to_string())
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, WebhookError>;
