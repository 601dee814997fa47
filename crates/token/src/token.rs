//! SSO 身份 Token
//!
//! 同一个 Token 类型覆盖两种来源：
//! - 会话 Token：包装会话服务创建的会话句柄
//! - 目录绑定 Token：直接对目录服务完成凭证绑定，绕过会话层
//!
//! 仅会话 Token 支持的操作在目录绑定 Token 上返回
//! [`TokenError::UnsupportedCapability`]

use crate::directory::{BindOutcome, DirectoryBind};
use crate::error::{TokenError, TokenResult};
use crate::listener::{TokenListener, TokenListenerBridge};
use crate::property::{PropertySource, PropertyStore};
use crate::restricted::RestrictedTokenResolver;
use crate::rewrite::UrlRewriter;
use crate::session::Session;
use crate::types::{DIRECT_BIND_AUTH_TYPE, Origin, Principal, TokenId, property_names};
use crate::validity::ValidityChecker;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// SSO 身份 Token
pub struct Token {
    backing: Backing,
}

enum Backing {
    Session(Arc<dyn Session>),
    DirectBind(DirectBindState),
}

struct DirectBindState {
    principal: Principal,
    properties: HashMap<String, String>,
    /// 认证上下文提供的 Token，属性查询时优先使用
    delegate: Option<Box<Token>>,
    /// 由持有方通过 `set_status` 覆盖，false 表示已销毁
    active: bool,
}

impl Token {
    /// 包装已有会话
    pub fn from_session(session: Arc<dyn Session>) -> Self {
        Self {
            backing: Backing::Session(session),
        }
    }

    /// 通过目录服务完成凭证绑定并创建 Token
    pub async fn bind(
        principal: &Principal,
        password: &str,
        directory: &dyn DirectoryBind,
    ) -> TokenResult<Self> {
        let outcome = directory
            .authenticate(principal, password)
            .await
            .map_err(|e| {
                error!("Directory authentication failed for {}: {}", principal, e);
                TokenError::Authentication {
                    principal: principal.name().to_string(),
                    source: e,
                }
            })?;

        debug!("Directory bind succeeded for {}", outcome.principal);
        Ok(Self::from_bind_outcome(outcome))
    }

    /// 包装目录绑定结果，并生成一次性的上下文 ID
    pub fn from_bind_outcome(outcome: BindOutcome) -> Self {
        let context_id = format!("{:x}", rand::random::<u64>());

        let mut properties = HashMap::new();
        properties.insert(property_names::AM_CTX_ID.to_string(), context_id);

        Self {
            backing: Backing::DirectBind(DirectBindState {
                principal: outcome.principal,
                properties,
                delegate: outcome.token.map(Box::new),
                active: true,
            }),
        }
    }

    pub fn origin(&self) -> Origin {
        match self.backing {
            Backing::Session(_) => Origin::SessionBacked,
            Backing::DirectBind(_) => Origin::DirectBind,
        }
    }

    /// 是否为目录绑定 Token
    pub fn is_ldap_connection(&self) -> bool {
        self.origin() == Origin::DirectBind
    }

    /// 会话句柄，目录绑定 Token 返回 `None`
    pub fn session(&self) -> Option<&Arc<dyn Session>> {
        match &self.backing {
            Backing::Session(session) => Some(session),
            Backing::DirectBind(_) => None,
        }
    }

    /// 能力检查：目录绑定 Token 不支持 `operation`
    pub fn check_token_type(&self, operation: &str) -> TokenResult<()> {
        self.require_session(operation).map(|_| ())
    }

    fn require_session(&self, operation: &str) -> TokenResult<&dyn Session> {
        match &self.backing {
            Backing::Session(session) => Ok(session.as_ref()),
            Backing::DirectBind(_) => {
                let err = TokenError::unsupported(operation);
                error!("{}", err);
                Err(err)
            }
        }
    }

    pub async fn principal(&self) -> TokenResult<Principal> {
        let session = match &self.backing {
            Backing::DirectBind(state) => return Ok(state.principal.clone()),
            Backing::Session(session) => session,
        };

        required_property(session.as_ref(), property_names::PRINCIPAL)
            .await
            .map(Principal::new)
            .inspect_err(|e| debug!("Can't get token principal name: {}", e))
    }

    /// 认证方式
    ///
    /// 会话升级后属性可能形如 `Ldap|Cert|Radius`，只返回第一个
    pub async fn auth_type(&self) -> TokenResult<String> {
        let session = match &self.backing {
            Backing::DirectBind(_) => return Ok(DIRECT_BIND_AUTH_TYPE.to_string()),
            Backing::Session(session) => session,
        };

        let types = required_property(session.as_ref(), property_names::AUTH_TYPE)
            .await
            .inspect_err(|e| error!("Can't get token authentication type: {}", e))?;
        Ok(first_auth_type(&types).to_string())
    }

    /// 认证级别
    ///
    /// 属性可能带有 realm 前缀，如 `/:10`
    pub async fn auth_level(&self) -> TokenResult<i32> {
        let session = self.require_session("auth_level")?;
        let raw = required_property(session, property_names::AUTH_LEVEL)
            .await
            .inspect_err(|e| error!("Can't get token authentication level: {}", e))?;
        parse_auth_level(&raw).inspect_err(|e| error!("{}", e))
    }

    /// 客户端 IP 地址，目录绑定 Token 返回回环地址
    pub async fn ip_address(&self) -> TokenResult<IpAddr> {
        let session = match &self.backing {
            Backing::DirectBind(_) => return Ok(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            Backing::Session(session) => session,
        };

        let host = session
            .property(property_names::HOST)
            .await
            .map_err(TokenError::from)
            .and_then(|host| host.filter(|h| !h.is_empty()).ok_or(TokenError::InvalidHost))
            .inspect_err(|e| error!("Can't get client's IPAddress: {}", e))?;

        resolve_host(&host).await
    }

    /// 客户端主机名，目录绑定 Token 返回本机主机名
    pub async fn host_name(&self) -> TokenResult<String> {
        let session = match &self.backing {
            Backing::DirectBind(_) => {
                let name = hostname::get().map_err(TokenError::LocalHost)?;
                return Ok(name.to_string_lossy().into_owned());
            }
            Backing::Session(session) => session,
        };

        session
            .property(property_names::HOST_NAME)
            .await
            .map_err(TokenError::from)
            .and_then(|name| {
                name.filter(|n| !n.is_empty())
                    .ok_or(TokenError::InvalidHostName)
            })
            .inspect_err(|e| error!("Can't get client's token host name: {}", e))
    }

    /// 剩余会话时间（秒）
    pub async fn time_left(&self) -> TokenResult<u64> {
        let session = self.require_session("time_left")?;
        session
            .time_left()
            .await
            .map_err(|e| log_session_error("Can't get token time left", e))
    }

    /// 最大会话时间（分钟）
    pub async fn max_session_time(&self) -> TokenResult<u64> {
        let session = self.require_session("max_session_time")?;
        session
            .max_session_time()
            .await
            .map_err(|e| log_session_error("Can't get token maximum time", e))
    }

    /// 空闲时间（秒）
    pub async fn idle_time(&self) -> TokenResult<u64> {
        let session = self.require_session("idle_time")?;
        session
            .idle_time()
            .await
            .map_err(|e| log_session_error("Can't get token idle time", e))
    }

    /// 最大空闲时间（分钟）
    pub async fn max_idle_time(&self) -> TokenResult<u64> {
        let session = self.require_session("max_idle_time")?;
        session
            .max_idle_time()
            .await
            .map_err(|e| log_session_error("Can't get token maximum idle time", e))
    }

    /// Token 标识
    ///
    /// 目录绑定 Token 只有在认证上下文提供了委托 Token 时才有标识
    pub fn token_id(&self) -> Option<TokenId> {
        match &self.backing {
            Backing::Session(session) => Some(TokenId::from_session_id(session.id())),
            Backing::DirectBind(state) => state.delegate.as_ref().and_then(|t| t.token_id()),
        }
    }

    pub async fn set_property(&mut self, name: &str, value: &str) -> TokenResult<()> {
        match &mut self.backing {
            Backing::DirectBind(state) => {
                state.properties.insert(name.to_string(), value.to_string());
                Ok(())
            }
            Backing::Session(session) => session.set_property(name, value).await.map_err(|e| {
                error!("Can't set property {} {}: {}", name, value, e);
                e.into()
            }),
        }
    }

    /// 严格读取属性
    pub async fn property(&self, name: &str) -> TokenResult<Option<String>> {
        self.property_store().resolve(name, true).await
    }

    /// 读取属性，`ignore_invalid_state` 为 true 时允许读取已失效会话
    pub async fn property_lenient(
        &self,
        name: &str,
        ignore_invalid_state: bool,
    ) -> TokenResult<Option<String>> {
        self.property_store()
            .resolve_lenient(name, ignore_invalid_state)
            .await
    }

    fn property_store(&self) -> PropertyStore<'_> {
        match &self.backing {
            Backing::Session(session) => PropertyStore::session(session.as_ref(), None),
            Backing::DirectBind(state) => PropertyStore::local(
                &state.properties,
                state
                    .delegate
                    .as_deref()
                    .map(|t| t as &dyn PropertySource),
            ),
        }
    }

    /// 注册 Token 变更监听器，目录绑定 Token 上为空操作
    pub async fn add_listener(&self, listener: Arc<dyn TokenListener>) -> TokenResult<()> {
        match &self.backing {
            Backing::DirectBind(_) => Ok(()),
            Backing::Session(session) => {
                TokenListenerBridge::register(session.as_ref(), listener).await
            }
        }
    }

    /// 是否有效（允许刷新空闲计时）
    pub async fn is_valid(&self) -> bool {
        self.is_valid_with(true).await
    }

    /// 是否有效，`reset_idle` 为 false 时不刷新空闲计时
    pub async fn is_valid_with(&self, reset_idle: bool) -> bool {
        match &self.backing {
            Backing::DirectBind(state) => state.active,
            Backing::Session(session) => {
                ValidityChecker::new(session.as_ref())
                    .is_valid(reset_idle)
                    .await
            }
        }
    }

    /// 校验 Token，无效时返回错误
    pub async fn validate(&self) -> TokenResult<()> {
        match &self.backing {
            Backing::DirectBind(state) if state.active => Ok(()),
            Backing::DirectBind(_) => Err(TokenError::InvalidToken {
                state: crate::types::SessionState::Destroyed,
            }),
            Backing::Session(session) => ValidityChecker::new(session.as_ref()).validate().await,
        }
    }

    /// 持有方覆盖目录绑定 Token 的有效标志，用作销毁信号
    pub fn set_status(&mut self, active: bool) {
        match &mut self.backing {
            Backing::DirectBind(state) => state.active = active,
            Backing::Session(session) => {
                warn!(
                    "set_status ignored for session backed token {}",
                    session.id()
                );
            }
        }
    }

    /// 将会话 ID 写入 URL
    pub fn encode_url(&self, url: &str, rewriter: &dyn UrlRewriter) -> TokenResult<String> {
        let session = self.require_session("encode_url")?;
        Ok(rewriter.encode(url, session))
    }

    /// 是否为受限 Token，目录绑定 Token 没有受限概念，始终返回 false
    pub async fn is_token_restricted(&self) -> TokenResult<bool> {
        match &self.backing {
            Backing::DirectBind(_) => Ok(false),
            Backing::Session(session) => {
                RestrictedTokenResolver::new(session.as_ref())
                    .is_restricted()
                    .await
            }
        }
    }

    /// 将受限 Token ID 映射回主 Token ID，`requester` 须为会话 Token
    pub async fn dereference_restricted_token_id(
        &self,
        requester: &Token,
        restricted_id: &str,
    ) -> TokenResult<String> {
        let Some(session) = self.session() else {
            return Err(TokenError::not_session_backed("dereferenceRestrictedTokenID"));
        };
        RestrictedTokenResolver::new(session.as_ref())
            .resolve(requester, restricted_id)
            .await
    }
}

#[async_trait]
impl PropertySource for Token {
    async fn lookup(&self, name: &str) -> TokenResult<Option<String>> {
        self.property(name).await
    }

    async fn lookup_lenient(&self, name: &str) -> TokenResult<Option<String>> {
        self.property_lenient(name, true).await
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("origin", &self.origin())
            .field("token_id", &self.token_id())
            .finish()
    }
}

async fn required_property(session: &dyn Session, name: &str) -> TokenResult<String> {
    session
        .property(name)
        .await?
        .ok_or_else(|| TokenError::MissingProperty {
            name: name.to_string(),
        })
}

fn log_session_error(message: &str, e: crate::error::SessionError) -> TokenError {
    error!("{}: {}", message, e);
    e.into()
}

fn first_auth_type(types: &str) -> &str {
    types.split('|').next().unwrap_or(types)
}

fn parse_auth_level(raw: &str) -> TokenResult<i32> {
    let level = raw.rsplit(':').next().unwrap_or(raw);
    level.parse().map_err(|source| TokenError::InvalidAuthLevel {
        value: raw.to_string(),
        source,
    })
}

async fn resolve_host(host: &str) -> TokenResult<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let resolution_error = |source: std::io::Error| TokenError::AddressResolution {
        host: host.to_string(),
        source,
    };
    tokio::net::lookup_host((host, 0))
        .await
        .map_err(resolution_error)?
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| {
            resolution_error(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no addresses returned",
            ))
        })
}
