//! 媒体请求路由服务
//!
//! 接收媒体请求通知，按过滤规则为请求挑选目标实例，并把实例配置写回媒体服务器。
//!
//! ## 模块结构
//!
//! - `client`: 媒体服务器 API 客户端
//! - `dispatch`: 目标实例分发
//! - `error`: 错误类型定义
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由配置
//! - `state`: 应用状态

pub mod client;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use client::{MediaServerClient, OverseerrClient};
pub use dispatch::{DispatchResult, PostData, send_to_instances};
pub use error::{Result, WebhookError};
pub use handlers::ApiMessage;
pub use routes::create_router;
pub use state::AppState;
