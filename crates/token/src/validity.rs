//! 会话有效性查询
//!
//! VALID、INACTIVE 视为有效，其余状态视为无效。
//! `is_valid` 遇到任何错误都返回 false（无法确认即视为无效）

use crate::error::{TokenError, TokenResult};
use crate::session::Session;
use tracing::debug;

/// 基于会话句柄的无状态有效性检查
pub struct ValidityChecker<'a> {
    session: &'a dyn Session,
}

impl<'a> ValidityChecker<'a> {
    pub fn new(session: &'a dyn Session) -> Self {
        Self { session }
    }

    /// 查询是否有效，从不返回错误
    ///
    /// `reset_idle` 为 false 时查询不刷新空闲计时
    pub async fn is_valid(&self, reset_idle: bool) -> bool {
        match self.session.state(reset_idle).await {
            Ok(state) => state.is_active(),
            Err(e) => {
                debug!(
                    "State lookup for session {} failed, treating as invalid: {}",
                    self.session.id(),
                    e
                );
                false
            }
        }
    }

    /// 与 `is_valid(true)` 相同的判定
    ///
    /// 状态无效返回 `InvalidToken`，状态查询失败返回 `UnverifiedToken`
    pub async fn validate(&self) -> TokenResult<()> {
        let state = self
            .session
            .state(true)
            .await
            .map_err(|source| TokenError::UnverifiedToken { source })?;
        if !state.is_active() {
            return Err(TokenError::InvalidToken { state });
        }
        Ok(())
    }
}
