//! 受限 Token 解析
//!
//! 受限 Token 的能力被限定在特定范围内，可由特权调用方映射回其主 Token

use crate::error::{TokenError, TokenResult};
use crate::session::Session;
use crate::token::Token;
use tracing::error;

pub struct RestrictedTokenResolver<'a> {
    session: &'a dyn Session,
}

impl<'a> RestrictedTokenResolver<'a> {
    pub fn new(session: &'a dyn Session) -> Self {
        Self { session }
    }

    pub async fn is_restricted(&self) -> TokenResult<bool> {
        Ok(self.session.is_restricted().await?)
    }

    /// 将受限 Token ID 映射回主 Token ID
    ///
    /// 请求方必须是会话 Token，映射在请求方会话的上下文中进行
    pub async fn resolve(&self, requester: &Token, restricted_id: &str) -> TokenResult<String> {
        let Some(requester_session) = requester.session() else {
            error!(
                "Can't dereference master token for id {}: requester is not session backed",
                restricted_id
            );
            return Err(TokenError::not_session_backed("dereferenceRestrictedTokenID"));
        };

        self.session
            .dereference_restricted_token_id(requester_session.as_ref(), restricted_id)
            .await
            .map_err(|e| {
                error!(
                    "Can't dereference master token for id {}: {}",
                    restricted_id, e
                );
                e.into()
            })
    }
}
