//! SSO Token 通用基础设施
//!
//! 提供配置加载与校验，以及配置相关的错误类型

pub mod config;
pub mod error;

pub use config::{LogConfig, ObservabilityConfig, SsoConfig};
pub use error::ConfigError;
