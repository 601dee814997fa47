//! 分层属性解析
//!
//! 查询顺序：
//! 1. 委托 Token（目录绑定时由认证上下文提供），取其非空值
//! 2. 目录绑定 Token 的本地属性表，或会话 Token 的会话属性
//!
//! 宽松模式下，委托也以宽松方式读取，读取失败视为无值；
//! 会话底层的严格查询失败后回退到不校验会话状态的读取

use crate::error::TokenResult;
use crate::session::Session;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, error};

/// 可作为第一优先级属性来源的对象
#[async_trait]
pub trait PropertySource: Send + Sync {
    async fn lookup(&self, name: &str) -> TokenResult<Option<String>>;

    /// 忽略会话状态的读取，默认与 `lookup` 相同
    async fn lookup_lenient(&self, name: &str) -> TokenResult<Option<String>> {
        self.lookup(name).await
    }
}

enum BaseSource<'a> {
    Local(&'a HashMap<String, String>),
    Session(&'a dyn Session),
}

/// 属性解析视图
///
/// 自身不持有状态，只引用各个属性来源
pub struct PropertyStore<'a> {
    delegate: Option<&'a dyn PropertySource>,
    base: BaseSource<'a>,
}

impl<'a> PropertyStore<'a> {
    /// 以本地属性表为底层来源
    pub fn local(
        properties: &'a HashMap<String, String>,
        delegate: Option<&'a dyn PropertySource>,
    ) -> Self {
        Self {
            delegate,
            base: BaseSource::Local(properties),
        }
    }

    /// 以会话属性为底层来源
    pub fn session(session: &'a dyn Session, delegate: Option<&'a dyn PropertySource>) -> Self {
        Self {
            delegate,
            base: BaseSource::Session(session),
        }
    }

    /// 严格解析
    ///
    /// `log_error` 控制会话读取失败时的日志级别
    pub async fn resolve(&self, name: &str, log_error: bool) -> TokenResult<Option<String>> {
        if let Some(delegate) = self.delegate
            && let Some(value) = delegate.lookup(name).await?.filter(|v| !v.is_empty())
        {
            return Ok(Some(value));
        }

        match self.base {
            BaseSource::Local(properties) => Ok(properties.get(name).cloned()),
            BaseSource::Session(session) => session.property(name).await.map_err(|e| {
                if log_error {
                    error!("Can't get property {}: {}", name, e);
                } else {
                    debug!("Can't get property {}: {}", name, e);
                }
                e.into()
            }),
        }
    }

    /// 宽松解析
    ///
    /// `ignore_invalid_state` 为 false 时等同于严格解析。
    /// 为 true 时委托读取失败视为无值，会话底层严格读取失败后
    /// 改用会话的免校验读取，本地属性表直接读取
    pub async fn resolve_lenient(
        &self,
        name: &str,
        ignore_invalid_state: bool,
    ) -> TokenResult<Option<String>> {
        if !ignore_invalid_state {
            return self.resolve(name, false).await;
        }

        if let Some(delegate) = self.delegate {
            match delegate.lookup_lenient(name).await {
                Ok(Some(value)) if !value.is_empty() => return Ok(Some(value)),
                Ok(_) => {}
                Err(e) => debug!("Delegate read of {} failed ({}), using base value", name, e),
            }
        }

        match self.base {
            BaseSource::Local(properties) => Ok(properties.get(name).cloned()),
            BaseSource::Session(session) => match session.property(name).await {
                Ok(value) => Ok(value),
                Err(e) => {
                    debug!(
                        "Strict read of {} failed ({}), falling back to unvalidated read",
                        name, e
                    );
                    let value = session.property_without_validation(name).await;
                    debug!("Unvalidated value of {}: {:?}", name, value);
                    Ok(value)
                }
            },
        }
    }
}
