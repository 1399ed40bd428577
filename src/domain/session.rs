// 会话实体与意图台账
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(SessionId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentState {
    InFlight, // 请求已发出，尚未返回
    Done,     // 后端已确认
}

/// 单个会话内已发出的意图键。检查与占位在同一把锁内完成
#[derive(Debug, Default)]
pub struct IntentLedger {
    entries: Mutex<HashMap<String, IntentState>>,
}

impl IntentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, IntentState>> {
        // 锁内不会 panic，中毒时直接沿用数据
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 键不存在时登记为 InFlight；已存在时返回其当前状态
    pub fn try_reserve(&self, key: &str) -> Result<(), IntentState> {
        let mut entries = self.lock();
        if let Some(state) = entries.get(key) {
            return Err(*state);
        }
        entries.insert(key.to_string(), IntentState::InFlight);
        Ok(())
    }

    pub fn complete(&self, key: &str) {
        self.lock().insert(key.to_string(), IntentState::Done);
    }

    /// 请求失败时撤销占位，调用方可重试
    pub fn release(&self, key: &str) {
        let mut entries = self.lock();
        if entries.get(key) == Some(&IntentState::InFlight) {
            entries.remove(key);
        }
    }

    pub fn state(&self, key: &str) -> Option<IntentState> {
        self.lock().get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 后端会话在客户端的表示，去重范围与会话生命周期一致
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    ledger: IntentLedger,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            ledger: IntentLedger::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn ledger(&self) -> &IntentLedger {
        &self.ledger
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapState {
    Uninitialized,
    Creating,
    Ready(Arc<Session>),
    Error(String),
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        // 台账不参与比较
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_is_exclusive_until_released() {
        let ledger = IntentLedger::new();
        assert_eq!(ledger.try_reserve("add-h1"), Ok(()));
        assert_eq!(ledger.try_reserve("add-h1"), Err(IntentState::InFlight));
        assert_eq!(ledger.state("add-h1"), Some(IntentState::InFlight));

        ledger.release("add-h1");
        assert!(!ledger.contains("add-h1"));
        assert_eq!(ledger.try_reserve("add-h1"), Ok(()));
    }

    #[test]
    fn completed_keys_are_never_released() {
        let ledger = IntentLedger::new();
        assert_eq!(ledger.try_reserve("h1-h2"), Ok(()));
        ledger.complete("h1-h2");
        ledger.release("h1-h2");
        assert_eq!(ledger.try_reserve("h1-h2"), Err(IntentState::Done));
        assert_eq!(ledger.state("h1-h2"), Some(IntentState::Done));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn session_id_parses_from_text() {
        assert_eq!("42".parse::<SessionId>().unwrap(), SessionId(42));
        assert_eq!(" 7\n".parse::<SessionId>().unwrap(), SessionId(7));
        assert!("abc".parse::<SessionId>().is_err());
    }
}
