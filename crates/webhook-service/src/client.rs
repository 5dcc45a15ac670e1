//! 媒体服务器客户端
//!
//! 处理流程只依赖 [`MediaServerClient`] trait，测试中使用 mockall 生成的实现替换。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url, header};
use serde_json::Value;
use tracing::debug;

use crate::dispatch::PostData;
use crate::error::{Result, WebhookError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// 媒体服务器接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaServerClient: Send + Sync {
    /// 获取媒体元数据 `GET /api/v1/{media_type}/{tmdb_id}`
    async fn fetch_media(&self, media_type: &str, tmdb_id: &str) -> Result<Value>;

    /// 审批请求 `POST /api/v1/request/{id}/approve`
    async fn approve_request(&self, request_id: &str) -> Result<()>;

    /// 写入实例配置 `PUT /api/v1/request/{id}`
    async fn apply_config(&self, request_id: &str, post_data: &PostData) -> Result<()>;

    /// 连通性探测 `GET /api/v1/auth/me`
    async fn test_connection(&self) -> Result<Value>;
}

/// 基于 reqwest 的 Overseerr 客户端
#[derive(Debug, Clone)]
pub struct OverseerrClient {
    http: reqwest::Client,
    base_url: Url,
    api_token: String,
}

impl OverseerrClient {
    pub fn new(base_url: &str, api_token: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| WebhookError::Internal(format!("无效的 Overseerr 地址 {}: {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_token: api_token.into(),
        })
    }

    /// 以服务器根为基准拼接绝对路径
    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| WebhookError::Internal(format!("无效的请求路径 {}: {}", path, e)))
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let url = self.endpoint(path)?;
        debug!(method = %method, url = %url, "Calling Overseerr");

        Ok(self
            .http
            .request(method, url)
            .header("X-Api-Key", &self.api_token)
            .header(header::ACCEPT, "application/json"))
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let response = self.request(Method::GET, path)?.send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(WebhookError::MediaServer {
                status: status.as_u16(),
                reason: reason(status),
            });
        }

        Ok(response.json().await?)
    }

    fn ensure_success(action: &'static str, status: StatusCode) -> Result<()> {
        if status.is_success() {
            Ok(())
        } else {
            Err(WebhookError::Rejected {
                action,
                status: status.as_u16(),
                reason: reason(status),
            })
        }
    }
}

fn reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

#[async_trait]
impl MediaServerClient for OverseerrClient {
    async fn fetch_media(&self, media_type: &str, tmdb_id: &str) -> Result<Value> {
        self.get_json(&format!("/api/v1/{}/{}", media_type, tmdb_id)).await
    }

    async fn approve_request(&self, request_id: &str) -> Result<()> {
        let response = self
            .request(Method::POST, &format!("/api/v1/request/{}/approve", request_id))?
            .send()
            .await?;

        Self::ensure_success("approve", response.status())
    }

    async fn apply_config(&self, request_id: &str, post_data: &PostData) -> Result<()> {
        let response = self
            .request(Method::PUT, &format!("/api/v1/request/{}", request_id))?
            .json(post_data)
            .send()
            .await?;

        Self::ensure_success("apply config", response.status())
    }

    async fn test_connection(&self) -> Result<Value> {
        self.get_json("/api/v1/auth/me").await
    }
}
