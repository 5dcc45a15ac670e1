//! 配置管理模块
//!
//! 服务自身的运行参数（监听地址、日志、指标、路由配置文件位置），
//! 支持多层配置文件加载与环境变量覆盖。

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::observability::ObservabilityConfig;

/// 服务配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3184,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub server: ServerConfig,
    pub observability: ObservabilityConfig,
    /// 路由配置文件（YAML）路径
    pub routing_config_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "request-router".to_string(),
            environment: "development".to_string(),
            server: ServerConfig::default(),
            observability: ObservabilityConfig::default(),
            routing_config_path: PathBuf::from("./config.yaml"),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（ROUTER_ 前缀，层级用双下划线，如 ROUTER_SERVER__PORT -> server.port）
    /// 5. 通用环境变量 PORT、LOG_LEVEL
    pub fn load(service_name: &str) -> Result<Self> {
        let env = std::env::var("ROUTER_ENV").unwrap_or_else(|_| "development".to_string());

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_from(service_name, &env, Path::new(&config_dir))
    }

    fn load_from(service_name: &str, env: &str, config_dir: &Path) -> Result<Self> {
        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", service_name))).required(false),
            )
            .add_source(
                Environment::with_prefix("ROUTER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        if let Some(port) = std::env::var("PORT").ok().and_then(|v| v.parse().ok()) {
            config.server.port = port;
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.observability.log_level = level;
        }

        config.observability.service_name = config.service_name.clone();

        Ok(config)
    }

    /// 加载配置，失败时输出原因并回退到默认配置
    ///
    /// 此时日志尚未初始化，错误直接写到 stderr。
    pub fn load_or_default(service_name: &str) -> Self {
        Self::or_default(Self::load(service_name))
    }

    fn or_default(result: Result<Self>) -> Self {
        result.unwrap_or_else(|e| {
            eprintln!("Failed to load service config, using defaults: {}", e);
            Self::default()
        })
    }

    /// 命令行指定的路由配置路径优先于配置文件
    pub fn with_routing_config_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.routing_config_path = path;
        }
        self
    }

    /// 获取服务地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3184);
        assert_eq!(config.server_addr(), "0.0.0.0:3184");
        assert_eq!(config.routing_config_path, PathBuf::from("./config.yaml"));
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_server_addr() {
        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            ..Default::default()
        };
        assert_eq!(config.server_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_layered_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "routing_config_path = \"/etc/router/config.yaml\"\n\n[server]\nport = 4000\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("staging.toml"),
            "[observability]\njson_logs = true\n",
        )
        .unwrap();

        let config = AppConfig::load_from("request-router", "staging", dir.path()).unwrap();

        assert_eq!(config.environment, "staging");
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.observability.json_logs);
        assert_eq!(config.observability.service_name, "request-router");
        assert_eq!(
            config.routing_config_path,
            PathBuf::from("/etc/router/config.yaml")
        );
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from("request-router", "development", dir.path()).unwrap();
        assert_eq!(config.routing_config_path, PathBuf::from("./config.yaml"));
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "routing_config_path = \"/etc/router/config.yaml\"\n\n[server]\nport = \"not-a-port\"\n",
        )
        .unwrap();

        let result = AppConfig::load_from("request-router", "development", dir.path());
        let err = result.as_ref().unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("server.port"));

        let config = AppConfig::or_default(result);
        assert_eq!(config.routing_config_path, PathBuf::from("./config.yaml"));
    }

    #[test]
    fn test_cli_routing_path_override() {
        let config = AppConfig::default().with_routing_config_path(Some(PathBuf::from("/tmp/r.yaml")));
        assert_eq!(config.routing_config_path, PathBuf::from("/tmp/r.yaml"));

        let config = AppConfig::default().with_routing_config_path(None);
        assert_eq!(config.routing_config_path, PathBuf::from("./config.yaml"));
    }
}
