// 本地键值持久化接口
use crate::error::ToynetResult;
use std::collections::HashMap;
use std::sync::RwLock;

/// 保存会话 ID 使用的键
pub const SESSION_KEY: &str = "toynet.session_id";

pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> ToynetResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> ToynetResult<()>;
    fn clear(&self, key: &str) -> ToynetResult<()>;
}

/// 进程内存储，进程退出即丢失
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> ToynetResult<Option<String>> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ToynetResult<()> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> ToynetResult<()> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
        Ok(())
    }
}
