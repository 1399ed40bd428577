// 命令模块：界面层调用入口，错误统一转为字符串

pub mod console;
pub mod device;
pub mod topology;

use crate::config::ToynetConfig;
use crate::error::ToynetResult;
use crate::services::backend::ToynetBackend;
use crate::services::bootstrap::SessionBootstrap;
use crate::services::command_router::TopologyRouter;
use crate::services::database::SqliteStore;
use crate::services::http_backend::HttpBackend;
use crate::services::session_store::{MemoryStore, SessionStore};
use crate::services::topology_cache::TopologyCache;
use std::sync::Arc;

/// 命令共享的应用状态
pub struct AppState {
    pub bootstrap: SessionBootstrap,
    pub router: TopologyRouter,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn ToynetBackend>,
        store: Arc<dyn SessionStore>,
        bot_user_id: &str,
        topology_id: u64,
    ) -> Self {
        let cache = Arc::new(TopologyCache::new());
        Self {
            bootstrap: SessionBootstrap::new(
                backend.clone(),
                store,
                cache.clone(),
                bot_user_id,
                topology_id,
            ),
            router: TopologyRouter::new(backend, cache),
        }
    }

    pub fn from_config(config: &ToynetConfig) -> ToynetResult<Self> {
        let backend: Arc<dyn ToynetBackend> = Arc::new(HttpBackend::new(config)?);
        let store: Arc<dyn SessionStore> = match &config.store_path {
            Some(path) => Arc::new(SqliteStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        };
        Ok(Self::new(
            backend,
            store,
            &config.bot_user_id,
            config.topology_id,
        ))
    }
}
