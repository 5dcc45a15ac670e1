//! 共享库
//!
//! 包含服务配置、路由配置文件加载、错误处理与可观测性等基础设施代码。

pub mod config;
pub mod error;
pub mod observability;
pub mod routing;

pub use config::{AppConfig, ServerConfig};
pub use error::{Result, RouterError};
pub use routing::{InstanceConfig, RoutingConfig};
