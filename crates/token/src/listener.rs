//! Token 监听桥接
//!
//! 将 Token 层监听器适配到会话服务原生的监听机制上，
//! 每次 `add_listener` 调用对应一个桥接实例

use crate::error::TokenResult;
use crate::session::{Session, SessionEvent, SessionListener};
use crate::token::Token;
use crate::types::{SessionEventType, TokenEventType};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error};

/// Token 变更监听器
pub trait TokenListener: Send + Sync {
    fn token_changed(&self, event: &TokenEvent);
}

/// Token 层事件，原样携带底层会话事件
#[derive(Debug, Clone)]
pub struct TokenEvent {
    inner: SessionEvent,
}

impl TokenEvent {
    pub fn event_type(&self) -> SessionEventType {
        self.inner.event_type()
    }

    /// Token 层事件类型，创建、重新激活等会话事件返回 `None`
    pub fn token_event_type(&self) -> Option<TokenEventType> {
        self.inner.event_type().token_event_type()
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.inner.time()
    }

    /// 以事件所属会话构造一个新的会话 Token
    pub fn token(&self) -> Token {
        Token::from_session(self.inner.session().clone())
    }
}

impl From<SessionEvent> for TokenEvent {
    fn from(inner: SessionEvent) -> Self {
        Self { inner }
    }
}

/// 会话监听器到 Token 监听器的适配器
pub struct TokenListenerBridge {
    listener: Arc<dyn TokenListener>,
}

impl TokenListenerBridge {
    pub fn new(listener: Arc<dyn TokenListener>) -> Self {
        Self { listener }
    }

    /// 包装监听器并注册到会话上，失败不重试
    pub async fn register(session: &dyn Session, listener: Arc<dyn TokenListener>) -> TokenResult<()> {
        let bridge: Arc<dyn SessionListener> = Arc::new(Self::new(listener));
        session.add_session_listener(bridge).await.map_err(|e| {
            error!("Couldn't add listener to the token {}: {}", session.id(), e);
            e.into()
        })
    }
}

impl SessionListener for TokenListenerBridge {
    fn session_changed(&self, event: &SessionEvent) {
        debug!(
            "Forwarding session event {} for {}",
            event.event_type(),
            event.session().id()
        );
        self.listener.token_changed(&TokenEvent::from(event.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SessionError, TokenError};
    use crate::test_utils::{MockSession, RecordingListener};

    #[tokio::test]
    async fn test_bridge_forwards_events_verbatim() {
        let session = Arc::new(MockSession::new());
        let listener = Arc::new(RecordingListener::default());

        TokenListenerBridge::register(session.as_ref(), listener.clone())
            .await
            .unwrap();
        session.fire(SessionEventType::PropertyChanged);
        session.fire(SessionEventType::Reactivation);

        let events = listener.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type(), SessionEventType::PropertyChanged);
        assert_eq!(
            events[0].token_event_type(),
            Some(TokenEventType::PropertyChanged)
        );
        assert_eq!(events[1].event_type(), SessionEventType::Reactivation);
        assert_eq!(events[1].token_event_type(), None);
    }

    #[tokio::test]
    async fn test_event_token_wraps_same_session() {
        let session = Arc::new(MockSession::new().with_id("sid-42"));
        let listener = Arc::new(RecordingListener::default());

        TokenListenerBridge::register(session.as_ref(), listener.clone())
            .await
            .unwrap();
        session.fire(SessionEventType::Logout);

        let event = &listener.events()[0];
        assert_eq!(event.token_event_type(), Some(TokenEventType::Destroy));
        let token = event.token();
        assert!(!token.is_ldap_connection());
        assert_eq!(token.token_id().unwrap().as_str(), "sid-42");
    }

    #[tokio::test]
    async fn test_registration_failure_surfaces() {
        let session = MockSession::new().rejecting_listeners();
        let listener = Arc::new(RecordingListener::default());

        let err = TokenListenerBridge::register(&session, listener)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TokenError::Session(SessionError::ListenerRejected(_))
        ));
        assert_eq!(session.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_each_registration_adds_one_bridge() {
        let session = MockSession::new();
        let listener = Arc::new(RecordingListener::default());

        TokenListenerBridge::register(&session, listener.clone())
            .await
            .unwrap();
        TokenListenerBridge::register(&session, listener)
            .await
            .unwrap();
        assert_eq!(session.listener_count(), 2);
    }
}
