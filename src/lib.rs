//! SSO 身份 Token
//!
//! 聚合 Token 核心与配置、日志等基础设施

pub mod error;
pub mod observability;

pub use error::{Error, Result};
pub use observability::{ObservabilityGuard, init_observability};
pub use ssotoken_common::{ConfigError, SsoConfig};
pub use ssotoken_core::{
    BindOutcome, DirectoryBind, DirectoryError, Origin, Principal, Session, SessionListener,
    SessionState, Token, TokenError, TokenEvent, TokenId, TokenListener, UrlRewriter,
};
