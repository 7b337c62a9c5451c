//! 调度层错误类型定义

use crate::source::BackendKind;
use gpsmux_hal::HalError;
use thiserror::Error;

/// 调度层错误类型
#[derive(Error, Debug)]
pub enum DispatchError {
    /// 路由目标后端没有可用句柄（工厂未提供）
    #[error("No {0} backend available")]
    BackendUnavailable(BackendKind),

    /// 尚未 init 就调用了 start/stop（或触发了切换）——
    /// 没有回调集可以转交给新后端
    #[error("Not initialized: call init() before start()/stop()")]
    NotInitialized,

    /// 当前后端自身的操作失败，原样上报
    #[error("Backend operation failed: {0}")]
    Backend(#[from] HalError),

    /// 切换中途失败：旧后端已 cleanup，新后端 init/start 未成功。
    /// 会话处于降级状态，需要显式 cleanup() + init() 恢复。
    #[error("Backend switch {from} -> {to} failed: {source}")]
    SwitchFailed {
        from: BackendKind,
        to: BackendKind,
        source: HalError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpsmux_hal::BackendFault;

    #[test]
    fn test_dispatch_error_display() {
        let msg = format!("{}", DispatchError::BackendUnavailable(BackendKind::External));
        assert_eq!(msg, "No external backend available");

        let msg = format!("{}", DispatchError::NotInitialized);
        assert!(msg.contains("init()"));

        let err = DispatchError::SwitchFailed {
            from: BackendKind::Internal,
            to: BackendKind::External,
            source: HalError::Device(BackendFault::from("dongle vanished")),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("internal -> external"));
        assert!(msg.contains("dongle vanished"));
    }

    #[test]
    fn test_from_hal_error() {
        let err: DispatchError = HalError::NotReady.into();
        assert!(matches!(err, DispatchError::Backend(HalError::NotReady)));
    }
}
