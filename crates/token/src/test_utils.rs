//! 测试工具模块
//!
//! 提供可编排行为的会话、目录服务与监听器替身

use crate::directory::{BindOutcome, DirectoryBind};
use crate::error::{DirectoryError, SessionError, SessionResult};
use crate::listener::{TokenEvent, TokenListener};
use crate::session::{Session, SessionEvent, SessionListener};
use crate::types::{Principal, SessionEventType, SessionState};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// 内存会话替身
pub struct MockSession {
    id: String,
    properties: Mutex<HashMap<String, String>>,
    state: Mutex<SessionState>,
    fail_reads: bool,
    fail_writes: bool,
    fail_state: bool,
    reject_listeners: bool,
    restricted: Option<bool>,
    restricted_ids: HashMap<(String, String), String>,
    times: [u64; 4],
    idle_resets: AtomicUsize,
    unvalidated_reads: AtomicUsize,
    listeners: Mutex<Vec<Arc<dyn SessionListener>>>,
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            properties: Mutex::new(HashMap::new()),
            state: Mutex::new(SessionState::Valid),
            fail_reads: false,
            fail_writes: false,
            fail_state: false,
            reject_listeners: false,
            restricted: Some(false),
            restricted_ids: HashMap::new(),
            times: [0; 4],
            idle_resets: AtomicUsize::new(0),
            unvalidated_reads: AtomicUsize::new(0),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_property(self, name: &str, value: &str) -> Self {
        self.properties
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_state(self, state: SessionState) -> Self {
        self.set_state(state);
        self
    }

    /// 校验读取全部失败，免校验读取仍可用
    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn failing_state(mut self) -> Self {
        self.fail_state = true;
        self
    }

    pub fn rejecting_listeners(mut self) -> Self {
        self.reject_listeners = true;
        self
    }

    /// `None` 表示查询受限标志时出错
    pub fn with_restricted(mut self, restricted: Option<bool>) -> Self {
        self.restricted = restricted;
        self
    }

    /// 在 `master_session_id` 上下文中登记受限 ID 到主 ID 的映射
    pub fn with_restricted_id(mut self, master_session_id: &str, restricted: &str, master: &str) -> Self {
        self.restricted_ids.insert(
            (master_session_id.to_string(), restricted.to_string()),
            master.to_string(),
        );
        self
    }

    /// time_left, max_session_time, idle_time, max_idle_time
    pub fn with_times(mut self, times: [u64; 4]) -> Self {
        self.times = times;
        self
    }

    pub fn set_state(&self, state: SessionState) {
        *self.state.lock().unwrap() = state;
    }

    pub fn stored_property(&self, name: &str) -> Option<String> {
        self.properties.lock().unwrap().get(name).cloned()
    }

    pub fn idle_resets(&self) -> usize {
        self.idle_resets.load(Ordering::SeqCst)
    }

    pub fn unvalidated_reads(&self) -> usize {
        self.unvalidated_reads.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    /// 向所有已注册的监听器派发事件
    pub fn fire(self: &Arc<Self>, event_type: SessionEventType) {
        let session: Arc<dyn Session> = self.clone();
        let event = SessionEvent::new(event_type, session);
        let listeners = self.listeners.lock().unwrap().clone();
        for listener in listeners {
            listener.session_changed(&event);
        }
    }

    fn check_readable(&self) -> SessionResult<()> {
        if self.fail_reads {
            return Err(SessionError::InvalidSession(self.id.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl Session for MockSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn property(&self, name: &str) -> SessionResult<Option<String>> {
        self.check_readable()?;
        Ok(self.stored_property(name))
    }

    async fn property_without_validation(&self, name: &str) -> Option<String> {
        self.unvalidated_reads.fetch_add(1, Ordering::SeqCst);
        self.stored_property(name)
    }

    async fn set_property(&self, name: &str, value: &str) -> SessionResult<()> {
        if self.fail_writes {
            return Err(SessionError::Service("property is protected".to_string()));
        }
        self.properties
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn time_left(&self) -> SessionResult<u64> {
        self.check_readable()?;
        Ok(self.times[0])
    }

    async fn max_session_time(&self) -> SessionResult<u64> {
        self.check_readable()?;
        Ok(self.times[1])
    }

    async fn idle_time(&self) -> SessionResult<u64> {
        self.check_readable()?;
        Ok(self.times[2])
    }

    async fn max_idle_time(&self) -> SessionResult<u64> {
        self.check_readable()?;
        Ok(self.times[3])
    }

    async fn state(&self, reset_idle: bool) -> SessionResult<SessionState> {
        if self.fail_state {
            return Err(SessionError::Service("state lookup failed".to_string()));
        }
        if reset_idle {
            self.idle_resets.fetch_add(1, Ordering::SeqCst);
        }
        Ok(*self.state.lock().unwrap())
    }

    async fn add_session_listener(&self, listener: Arc<dyn SessionListener>) -> SessionResult<()> {
        if self.reject_listeners {
            return Err(SessionError::ListenerRejected(self.id.clone()));
        }
        self.listeners.lock().unwrap().push(listener);
        Ok(())
    }

    async fn is_restricted(&self) -> SessionResult<bool> {
        self.restricted
            .ok_or_else(|| SessionError::Service("restriction lookup failed".to_string()))
    }

    async fn dereference_restricted_token_id(
        &self,
        master_session: &dyn Session,
        restricted_id: &str,
    ) -> SessionResult<String> {
        self.restricted_ids
            .get(&(master_session.id().to_string(), restricted_id.to_string()))
            .cloned()
            .ok_or_else(|| SessionError::RestrictedTokenNotFound(restricted_id.to_string()))
    }
}

/// 目录服务替身
pub struct MockDirectory {
    password: String,
    resolved: Principal,
    token: Mutex<Option<crate::Token>>,
}

impl MockDirectory {
    pub fn new(password: &str, resolved: &str) -> Self {
        Self {
            password: password.to_string(),
            resolved: Principal::new(resolved),
            token: Mutex::new(None),
        }
    }

    /// 绑定成功时随结果返回的委托 Token（仅返回一次）
    pub fn with_token(self, token: crate::Token) -> Self {
        *self.token.lock().unwrap() = Some(token);
        self
    }
}

#[async_trait]
impl DirectoryBind for MockDirectory {
    async fn authenticate(
        &self,
        _principal: &Principal,
        password: &str,
    ) -> Result<BindOutcome, DirectoryError> {
        if password != self.password {
            return Err(DirectoryError::InvalidCredentials);
        }
        let mut outcome = BindOutcome::new(self.resolved.clone());
        outcome.token = self.token.lock().unwrap().take();
        Ok(outcome)
    }
}

/// 记录收到事件的监听器
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<TokenEvent>>,
}

impl RecordingListener {
    pub fn events(&self) -> Vec<TokenEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl TokenListener for RecordingListener {
    fn token_changed(&self, event: &TokenEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
