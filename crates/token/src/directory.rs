//! 目录绑定协作接口
//!
//! 凭证校验由外部目录服务完成，Token 只消费其结果

use crate::error::DirectoryError;
use crate::token::Token;
use crate::types::Principal;
use async_trait::async_trait;

/// 目录绑定成功后的结果
pub struct BindOutcome {
    /// 目录解析后的主体（通常为完整 DN）
    pub principal: Principal,

    /// 认证上下文中已有的 Token，作为属性查询的第一优先级来源
    pub token: Option<Token>,
}

impl BindOutcome {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            token: None,
        }
    }

    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }
}

/// 目录凭证绑定服务
#[async_trait]
pub trait DirectoryBind: Send + Sync {
    async fn authenticate(
        &self,
        principal: &Principal,
        password: &str,
    ) -> Result<BindOutcome, DirectoryError>;
}
