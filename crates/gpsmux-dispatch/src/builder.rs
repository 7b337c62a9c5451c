//! Builder 模式实现
//!
//! 链式构造 [`GpsMux`]：注入后端句柄、偏好来源与在位探测。
//! 没有注入的后端在被路由到时返回
//! [`DispatchError`](crate::DispatchError)`::BackendUnavailable`，
//! 而不是崩溃。

use crate::mux::{BackendSet, GpsMux};
use crate::source::{
    DevicePathProbe, EnvOverride, OverrideSource, PresenceProbe, SourceSelector,
};
use gpsmux_hal::GpsBackend;
use std::path::PathBuf;

/// GpsMux Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use gpsmux_dispatch::GpsMux;
///
/// // 默认：偏好读 GPSMUX_BACKEND 环境变量，探测 /dev/ttyACM0
/// let mux = GpsMux::builder()
///     .device_path("/dev/ttyUSB1")
///     .build();
/// # let _ = mux;
/// ```
pub struct GpsMuxBuilder {
    internal: Option<Box<dyn GpsBackend + Send>>,
    external: Option<Box<dyn GpsBackend + Send>>,
    override_source: Option<Box<dyn OverrideSource + Send + Sync>>,
    probe: Option<Box<dyn PresenceProbe + Send + Sync>>,
}

impl GpsMuxBuilder {
    pub fn new() -> Self {
        Self {
            internal: None,
            external: None,
            override_source: None,
            probe: None,
        }
    }

    /// 注入内置后端句柄
    pub fn internal(mut self, backend: impl GpsBackend + Send + 'static) -> Self {
        self.internal = Some(Box::new(backend));
        self
    }

    /// 注入外接后端句柄
    pub fn external(mut self, backend: impl GpsBackend + Send + 'static) -> Self {
        self.external = Some(Box::new(backend));
        self
    }

    /// 自定义偏好来源（默认读 `GPSMUX_BACKEND` 环境变量）
    pub fn override_source(mut self, source: impl OverrideSource + Send + Sync + 'static) -> Self {
        self.override_source = Some(Box::new(source));
        self
    }

    /// 自定义在位探测（默认检查 `/dev/ttyACM0`）
    pub fn presence_probe(mut self, probe: impl PresenceProbe + Send + Sync + 'static) -> Self {
        self.probe = Some(Box::new(probe));
        self
    }

    /// 便捷方法：探测指定设备节点的在位状态
    pub fn device_path(self, path: impl Into<PathBuf>) -> Self {
        self.presence_probe(DevicePathProbe::new(path))
    }

    /// 构造 `GpsMux`，并求值一次确定初始权威后端
    pub fn build(self) -> GpsMux {
        let selector = SourceSelector::from_boxed(
            self.override_source
                .unwrap_or_else(|| Box::new(EnvOverride::default())),
            self.probe
                .unwrap_or_else(|| Box::new(DevicePathProbe::default())),
        );
        GpsMux::new(
            BackendSet {
                internal: self.internal,
                external: self.external,
            },
            selector,
        )
    }
}

impl Default for GpsMuxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{BackendKind, FnOverride, FnProbe};

    #[test]
    fn test_build_seeds_active_backend_from_selector() {
        let mux = GpsMux::builder()
            .override_source(FnOverride(|| Some("external".to_string())))
            .presence_probe(FnProbe(|| false))
            .build();
        assert_eq!(mux.active_backend(), BackendKind::External);
    }

    #[test]
    fn test_build_without_handles_is_constructible() {
        // 句柄缺失不是构造错误，只在被路由到时报 BackendUnavailable
        let mux = GpsMux::builder()
            .override_source(FnOverride(|| None))
            .presence_probe(FnProbe(|| false))
            .build();
        assert_eq!(mux.active_backend(), BackendKind::Internal);
    }
}
