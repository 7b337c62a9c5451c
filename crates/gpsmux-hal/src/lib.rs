//! # GPS 后端能力抽象层
//!
//! 定位硬件抽象层，提供统一的 GPS 后端接口抽象。
//!
//! 每个具体定位设备（内置芯片、外接 dongle 等）实现 [`GpsBackend`]，
//! 上层调度器通过该 trait 驱动设备生命周期（init/start/stop/cleanup）
//! 并转发辅助数据注入（时间、位置、星历删除、定位模式配置）。
//!
//! 回调集以 [`SharedCallbacks`]（`Arc`）形式在后端之间共享：
//! 后端热切换时，新后端拿到的是与旧后端完全相同的一份回调。

use std::any::Any;
use std::sync::Arc;
use thiserror::Error;

pub mod types;

#[cfg(feature = "mock")]
pub mod mock;

pub use types::{
    AidingData, GpsStatus, GpsUtcTime, Location, PositionMode, PositionModeParams,
    PositionRecurrence,
};

/// 消费者提供的定位事件回调集
///
/// 对应传统 GPS HAL 的 `GpsCallbacks` 结构体。回调的具体载荷格式
/// 由后端原样透传，本层不做任何转换。
pub trait GpsEventSink {
    /// 定位结果回调
    fn on_location(&self, location: Location);

    /// 引擎/会话状态回调
    fn on_status(&self, status: GpsStatus);

    /// NMEA 语句回调（可选实现）
    fn on_nmea(&self, timestamp: GpsUtcTime, sentence: &str) {
        let _ = (timestamp, sentence);
    }
}

/// 共享回调集
///
/// 同一个 `Arc` 会在后端切换时原样传给新后端，保证消费者观察到的
/// 回调目标在整个会话中保持不变。
pub type SharedCallbacks = Arc<dyn GpsEventSink + Send + Sync>;

/// 按名称导出的扩展能力（不透明对象，逐后端自定义）
pub type Extension = Arc<dyn Any + Send + Sync>;

/// HAL 层统一错误类型
#[derive(Error, Debug)]
pub enum HalError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(#[from] BackendFault),
    #[error("Backend not ready")]
    NotReady,
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// 设备/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendFaultKind {
    Unknown,
    NoDevice,
    AccessDenied,
    Busy,
    Protocol,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct BackendFault {
    pub kind: BackendFaultKind,
    pub message: String,
}

impl BackendFault {
    pub fn new(kind: BackendFaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            BackendFaultKind::NoDevice | BackendFaultKind::AccessDenied
        )
    }
}

impl From<String> for BackendFault {
    fn from(message: String) -> Self {
        Self::new(BackendFaultKind::Unknown, message)
    }
}

impl From<&str> for BackendFault {
    fn from(message: &str) -> Self {
        Self::new(BackendFaultKind::Unknown, message)
    }
}

/// 定位后端能力接口
///
/// 生命周期约定：`init` → `start` → `stop` → … → `cleanup`。
/// `cleanup` 之后后端回到未初始化状态，可以再次 `init`。
/// 所有操作显式返回 `Result`，后端失败必须如实上报，不允许吞掉。
pub trait GpsBackend {
    /// 初始化后端并注册回调集，不开始定位
    fn init(&mut self, callbacks: SharedCallbacks) -> Result<(), HalError>;

    /// 开始定位（要求已 init）
    fn start(&mut self) -> Result<(), HalError>;

    /// 停止定位（保持已初始化状态）
    fn stop(&mut self) -> Result<(), HalError>;

    /// 释放后端资源，回到未初始化状态
    fn cleanup(&mut self) -> Result<(), HalError>;

    /// 注入参考时间（UTC 毫秒、时间基准、不确定度毫秒）
    fn inject_time(
        &mut self,
        time: GpsUtcTime,
        reference: i64,
        uncertainty_ms: i32,
    ) -> Result<(), HalError>;

    /// 注入参考位置（粗定位辅助）
    fn inject_location(
        &mut self,
        latitude: f64,
        longitude: f64,
        accuracy_m: f32,
    ) -> Result<(), HalError>;

    /// 删除辅助数据（冷启动/测试用）
    fn delete_aiding_data(&mut self, flags: AidingData) -> Result<(), HalError>;

    /// 配置定位模式与上报间隔
    fn set_position_mode(&mut self, params: PositionModeParams) -> Result<(), HalError>;

    /// 按名称查询扩展能力，不存在时返回 `None`
    fn get_extension(&self, name: &str) -> Option<Extension>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_fault_display() {
        let fault = BackendFault::new(BackendFaultKind::NoDevice, "/dev/ttyACM0 disappeared");
        let msg = format!("{}", fault);
        assert!(msg.contains("NoDevice"));
        assert!(msg.contains("/dev/ttyACM0"));
    }

    #[test]
    fn test_backend_fault_fatal_classification() {
        assert!(BackendFault::new(BackendFaultKind::NoDevice, "x").is_fatal());
        assert!(BackendFault::new(BackendFaultKind::AccessDenied, "x").is_fatal());
        assert!(!BackendFault::new(BackendFaultKind::Busy, "x").is_fatal());
        assert!(!BackendFault::new(BackendFaultKind::Unknown, "x").is_fatal());
    }

    #[test]
    fn test_hal_error_from_fault() {
        let err: HalError = BackendFault::from("boom").into();
        assert!(matches!(err, HalError::Device(_)));
    }
}
