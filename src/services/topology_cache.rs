// 拓扑读取缓存（按会话）
use crate::domain::session::SessionId;
use crate::domain::topology::TopologySnapshot;
use crate::error::ToynetResult;
use crate::services::backend::ToynetBackend;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct CacheEntry {
    snapshot: Option<TopologySnapshot>,
    invalidations: u64,
}

/// 快照与失效计数放在同一把锁下，比较计数与写入快照是原子的
#[derive(Debug, Default)]
pub struct TopologyCache {
    entries: RwLock<HashMap<SessionId, CacheEntry>>,
}

impl TopologyCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<SessionId, CacheEntry>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<SessionId, CacheEntry>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, id: SessionId) -> Option<TopologySnapshot> {
        self.read().get(&id).and_then(|entry| entry.snapshot.clone())
    }

    /// 命中则直接返回；否则向后端读取并写入缓存。读取期间不持锁
    pub async fn get_or_fetch(
        &self,
        backend: &dyn ToynetBackend,
        id: SessionId,
    ) -> ToynetResult<TopologySnapshot> {
        if let Some(snapshot) = self.get(id) {
            return Ok(snapshot);
        }
        self.refresh(backend, id).await
    }

    /// 读取期间若发生失效，结果照常返回但不写入缓存，避免旧快照覆盖变更
    pub async fn refresh(
        &self,
        backend: &dyn ToynetBackend,
        id: SessionId,
    ) -> ToynetResult<TopologySnapshot> {
        let generation = self.invalidation_count(id);
        debug!("Fetching topology for session {}", id);
        let raw = backend.get_session(id).await?;
        let snapshot = TopologySnapshot::new(id, raw);

        let mut entries = self.write();
        let entry = entries.entry(id).or_default();
        if entry.invalidations == generation {
            entry.snapshot = Some(snapshot.clone());
        } else {
            debug!(
                "Session {} invalidated during fetch, snapshot not cached",
                id
            );
        }
        Ok(snapshot)
    }

    pub fn invalidate(&self, id: SessionId) {
        let mut entries = self.write();
        let entry = entries.entry(id).or_default();
        entry.snapshot = None;
        entry.invalidations += 1;
        debug!("Invalidated cached topology for session {}", id);
    }

    /// 该会话累计失效次数
    pub fn invalidation_count(&self, id: SessionId) -> u64 {
        self.read()
            .get(&id)
            .map(|entry| entry.invalidations)
            .unwrap_or(0)
    }
}
