//! 统一错误处理模块
//!
//! 定义配置加载与基础设施层共享的错误类型。

use thiserror::Error;

/// 共享层错误类型
#[derive(Debug, Error)]
pub enum RouterError {
    // ==================== 服务配置错误 ====================
    #[error("服务配置加载失败: {0}")]
    Config(#[from] config::ConfigError),

    // ==================== 路由配置错误 ====================
    #[error("Configuration file not found at: {path}")]
    RoutingFileNotFound { path: String },

    #[error("读取路由配置失败: {path} - {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("路由配置 YAML 解析失败: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("路由配置校验失败:\n{0}")]
    InvalidRoutingConfig(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, RouterError>;

impl RouterError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::RoutingFileNotFound { .. } => "ROUTING_FILE_NOT_FOUND",
            Self::Io { .. } => "IO_ERROR",
            Self::Yaml(_) => "YAML_ERROR",
            Self::InvalidRoutingConfig(_) => "INVALID_ROUTING_CONFIG",
        }
    }
}
