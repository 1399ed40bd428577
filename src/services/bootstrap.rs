// 会话引导：读取本地会话 ID，缺失时向后端创建并保存
use crate::domain::session::{BootstrapState, Session, SessionId};
use crate::domain::topology::TopologySnapshot;
use crate::error::ToynetResult;
use crate::services::backend::ToynetBackend;
use crate::services::session_store::{SessionStore, SESSION_KEY};
use crate::services::topology_cache::TopologyCache;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub struct SessionBootstrap {
    backend: Arc<dyn ToynetBackend>,
    store: Arc<dyn SessionStore>,
    cache: Arc<TopologyCache>,
    bot_user_id: String,
    topology_id: u64,
    state: Mutex<BootstrapState>,
    // 串行化创建过程，并发调用只会创建一个会话
    creation: tokio::sync::Mutex<()>,
}

impl SessionBootstrap {
    pub fn new(
        backend: Arc<dyn ToynetBackend>,
        store: Arc<dyn SessionStore>,
        cache: Arc<TopologyCache>,
        bot_user_id: impl Into<String>,
        topology_id: u64,
    ) -> Self {
        Self {
            backend,
            store,
            cache,
            bot_user_id: bot_user_id.into(),
            topology_id,
            state: Mutex::new(BootstrapState::Uninitialized),
            creation: tokio::sync::Mutex::new(()),
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_state(&self, next: BootstrapState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }

    /// 已就绪时返回当前会话
    pub fn current(&self) -> Option<Arc<Session>> {
        match self.state() {
            BootstrapState::Ready(session) => Some(session),
            _ => None,
        }
    }

    pub async fn ensure_session(&self) -> ToynetResult<Arc<Session>> {
        let _creation = self.creation.lock().await;
        if let Some(session) = self.current() {
            return Ok(session);
        }

        match self.resolve().await {
            Ok(session) => {
                self.set_state(BootstrapState::Ready(session.clone()));
                Ok(session)
            }
            Err(e) => {
                warn!("Session bootstrap failed: {}", e);
                self.set_state(BootstrapState::Error(e.to_string()));
                Err(e)
            }
        }
    }

    async fn resolve(&self) -> ToynetResult<Arc<Session>> {
        if let Some(raw) = self.store.get(SESSION_KEY)? {
            match raw.parse::<SessionId>() {
                Ok(id) => {
                    info!("Reusing stored session {}", id);
                    return Ok(Arc::new(Session::new(id)));
                }
                Err(_) => {
                    warn!("Discarding malformed stored session id {:?}", raw);
                    self.store.clear(SESSION_KEY)?;
                }
            }
        }

        self.set_state(BootstrapState::Creating);
        let id = self
            .backend
            .create_session(&self.bot_user_id, self.topology_id)
            .await?;
        self.store.set(SESSION_KEY, &id.to_string())?;
        info!(
            "Created session {} (topology template {})",
            id, self.topology_id
        );
        Ok(Arc::new(Session::new(id)))
    }

    /// 当前会话的拓扑快照，优先读缓存
    pub async fn topology(&self) -> ToynetResult<TopologySnapshot> {
        let session = self.ensure_session().await?;
        self.cache
            .get_or_fetch(self.backend.as_ref(), session.id())
            .await
    }

    pub async fn refresh_topology(&self) -> ToynetResult<TopologySnapshot> {
        let session = self.ensure_session().await?;
        self.cache.refresh(self.backend.as_ref(), session.id()).await
    }

    /// 丢弃本地会话，下次访问时重新创建
    pub async fn reset(&self) -> ToynetResult<()> {
        let _creation = self.creation.lock().await;
        if let Some(session) = self.current() {
            self.cache.invalidate(session.id());
        }
        self.store.clear(SESSION_KEY)?;
        self.set_state(BootstrapState::Uninitialized);
        info!("Session reset");
        Ok(())
    }
}
