//! SSO 身份 Token 核心
//!
//! 为已认证主体提供统一的 Token 能力接口，支持两种来源：
//! - 会话 Token：状态与属性委托给外部会话服务
//! - 目录绑定 Token：由一次目录凭证绑定创建，独立于会话存储
//!
//! # 组件
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Token                                       │
//! │  ┌───────────────┐    ┌──────────────────┐   │
//! │  │ PropertyStore │    │ ValidityChecker  │   │
//! │  └───────┬───────┘    └────────┬─────────┘   │
//! │          │                     │             │
//! │  ┌───────▼──────────┐  ┌───────▼─────────┐   │
//! │  │ TokenListener-   │  │ RestrictedToken-│   │
//! │  │ Bridge           │  │ Resolver        │   │
//! │  └───────┬──────────┘  └───────┬─────────┘   │
//! └──────────┼─────────────────────┼─────────────┘
//!            ▼                     ▼
//!      Session (外部会话服务)   DirectoryBind (外部目录服务)
//! ```
//!
//! # 使用示例
//!
//! ```ignore
//! use ssotoken_core::{Token, Principal};
//!
//! let token = Token::bind(&Principal::new("jdoe"), "secret", &directory).await?;
//! assert!(token.is_ldap_connection());
//! assert_eq!(token.auth_type().await?, "LDAP");
//! ```

pub mod directory;
pub mod error;
pub mod listener;
pub mod property;
pub mod restricted;
pub mod rewrite;
pub mod session;
pub mod token;
pub mod types;
pub mod validity;

#[cfg(test)]
pub mod test_utils;

pub use directory::{BindOutcome, DirectoryBind};
pub use error::{DirectoryError, SessionError, SessionResult, TokenError, TokenResult};
pub use listener::{TokenEvent, TokenListener, TokenListenerBridge};
pub use property::{PropertySource, PropertyStore};
pub use restricted::RestrictedTokenResolver;
pub use rewrite::UrlRewriter;
pub use session::{Session, SessionEvent, SessionListener};
pub use token::Token;
pub use types::{
    Origin, Principal, SessionEventType, SessionState, TokenEventType, TokenId, property_names,
};
pub use validity::ValidityChecker;
