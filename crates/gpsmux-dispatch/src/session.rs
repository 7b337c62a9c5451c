//! 会话状态
//!
//! 记录当前权威后端、初始化/启动标志和消费者注册的回调集。
//! 不变量：`started == true` 蕴含 `initialized == true`；
//! `active` 变更时另一个后端必然已被 cleanup（或从未 init 过）。
//! 状态只由调度器在锁内修改。

use crate::source::BackendKind;
use gpsmux_hal::SharedCallbacks;

pub(crate) struct SessionState {
    pub(crate) active: BackendKind,
    pub(crate) initialized: bool,
    pub(crate) started: bool,
    pub(crate) callbacks: Option<SharedCallbacks>,
}

impl SessionState {
    pub(crate) fn new(active: BackendKind) -> Self {
        Self {
            active,
            initialized: false,
            started: false,
            callbacks: None,
        }
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            active: self.active,
            initialized: self.initialized,
            started: self.started,
        }
    }

    /// 切换失败或 cleanup 后回到未初始化状态
    pub(crate) fn reset(&mut self) {
        self.initialized = false;
        self.started = false;
        self.callbacks = None;
    }
}

/// 会话状态的只读快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// 当前权威后端
    pub active: BackendKind,
    /// 是否已 init
    pub initialized: bool,
    /// 是否正在定位
    pub started: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_uninitialized() {
        let state = SessionState::new(BackendKind::Internal);
        let snap = state.snapshot();
        assert_eq!(snap.active, BackendKind::Internal);
        assert!(!snap.initialized);
        assert!(!snap.started);
        assert!(state.callbacks.is_none());
    }

    #[test]
    fn test_reset_clears_flags_and_callbacks() {
        let mut state = SessionState::new(BackendKind::External);
        state.initialized = true;
        state.started = true;
        state.reset();
        assert!(!state.initialized);
        assert!(!state.started);
        assert!(state.callbacks.is_none());
        // active 不受 reset 影响
        assert_eq!(state.active, BackendKind::External);
    }
}
