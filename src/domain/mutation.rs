// 单次变更调用的状态
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum MutationState {
    Idle,
    Pending,
    Success,
    Error(String),
}

/// 路由调用的结果：已发送或因重复被跳过。
/// in_flight 为 true 表示相同意图的请求仍在等待后端，结果未定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied { command: String },
    Skipped { key: String, in_flight: bool },
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied { .. })
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, MutationOutcome::Skipped { in_flight: true, .. })
    }
}

/// 供界面层观察的调用状态句柄
#[derive(Debug, Clone)]
pub struct MutationHandle {
    state: Arc<Mutex<MutationState>>,
}

impl MutationHandle {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MutationState::Idle)),
        }
    }

    pub fn state(&self) -> MutationState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set(&self, next: MutationState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }

    pub fn begin(&self) {
        self.set(MutationState::Pending);
    }

    pub fn succeed(&self) {
        self.set(MutationState::Success);
    }

    pub fn fail(&self, message: impl Into<String>) {
        self.set(MutationState::Error(message.into()));
    }

    pub fn reset(&self) {
        self.set(MutationState::Idle);
    }

    pub fn is_pending(&self) -> bool {
        self.state() == MutationState::Pending
    }
}

impl Default for MutationHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_transitions() {
        let handle = MutationHandle::new();
        assert_eq!(handle.state(), MutationState::Idle);
        handle.begin();
        assert!(handle.is_pending());
        handle.fail("boom");
        assert_eq!(handle.state(), MutationState::Error("boom".to_string()));
        handle.reset();
        handle.begin();
        handle.succeed();
        assert_eq!(handle.state(), MutationState::Success);
    }

    #[test]
    fn clones_share_state() {
        let handle = MutationHandle::new();
        let observer = handle.clone();
        handle.begin();
        assert!(observer.is_pending());
    }
}
