//! 定位源选择器
//!
//! 每次求值时重新读取偏好配置并重新执行在位探测（外接设备可能
//! 在运行中被拔掉），绝不缓存结果。偏好配置优先于探测结果。

use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

/// 后端标识，有且只有两个
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// 内置定位芯片
    Internal,
    /// 外接定位模块
    External,
}

impl BackendKind {
    /// 另一个后端
    pub fn other(self) -> BackendKind {
        match self {
            BackendKind::Internal => BackendKind::External,
            BackendKind::External => BackendKind::Internal,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Internal => write!(f, "internal"),
            BackendKind::External => write!(f, "external"),
        }
    }
}

/// 解析后的偏好配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preference {
    /// 强制内置后端
    Internal,
    /// 强制外接后端
    External,
    /// 自动检测（在位探测决定）
    #[default]
    Auto,
}

impl Preference {
    /// 解析配置字符串
    ///
    /// 只认精确的 `"internal"` / `"external"` 两个 token，其余一律
    /// 视为自动检测（包括空串和拼错的值）。
    pub fn parse(value: &str) -> Preference {
        match value {
            "internal" => Preference::Internal,
            "external" => Preference::External,
            _ => Preference::Auto,
        }
    }

    pub fn parse_opt(value: Option<&str>) -> Preference {
        value.map(Preference::parse).unwrap_or(Preference::Auto)
    }
}

/// 偏好配置来源（每次求值重新读取）
pub trait OverrideSource {
    /// 当前配置值；未配置时返回 `None`
    fn current(&self) -> Option<String>;
}

/// 在位探测（每次求值重新执行）
pub trait PresenceProbe {
    /// 外接设备当前是否在位
    fn is_present(&self) -> bool;
}

/// 闭包适配：`Fn() -> Option<String>` 作为偏好来源
pub struct FnOverride<F>(pub F);

impl<F: Fn() -> Option<String>> OverrideSource for FnOverride<F> {
    fn current(&self) -> Option<String> {
        (self.0)()
    }
}

/// 闭包适配：`Fn() -> bool` 作为在位探测
pub struct FnProbe<F>(pub F);

impl<F: Fn() -> bool> PresenceProbe for FnProbe<F> {
    fn is_present(&self) -> bool {
        (self.0)()
    }
}

/// 从环境变量读取偏好（持久化系统属性的替代品）
pub struct EnvOverride {
    var: String,
}

impl EnvOverride {
    /// 默认环境变量名
    pub const DEFAULT_VAR: &'static str = "GPSMUX_BACKEND";

    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvOverride {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VAR)
    }
}

impl OverrideSource for EnvOverride {
    fn current(&self) -> Option<String> {
        std::env::var(&self.var).ok()
    }
}

/// 文件系统在位探测：检查设备节点是否存在
#[derive(Debug, Clone)]
pub struct DevicePathProbe {
    path: PathBuf,
}

impl DevicePathProbe {
    /// 常见外接 GPS dongle 的串口设备节点
    pub const DEFAULT_DEVICE: &'static str = "/dev/ttyACM0";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Default for DevicePathProbe {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DEVICE)
    }
}

impl PresenceProbe for DevicePathProbe {
    fn is_present(&self) -> bool {
        self.path.exists()
    }
}

/// 定位源选择器
///
/// 决策优先级：
/// 1. 偏好配置为 `internal` / `external` 时直接生效
/// 2. 否则由在位探测决定：在位 → 外接，不在位 → 内置
pub struct SourceSelector {
    override_source: Box<dyn OverrideSource + Send + Sync>,
    probe: Box<dyn PresenceProbe + Send + Sync>,
}

impl SourceSelector {
    pub fn new(
        override_source: impl OverrideSource + Send + Sync + 'static,
        probe: impl PresenceProbe + Send + Sync + 'static,
    ) -> Self {
        Self {
            override_source: Box::new(override_source),
            probe: Box::new(probe),
        }
    }

    pub(crate) fn from_boxed(
        override_source: Box<dyn OverrideSource + Send + Sync>,
        probe: Box<dyn PresenceProbe + Send + Sync>,
    ) -> Self {
        Self {
            override_source,
            probe,
        }
    }

    /// 求值：此刻哪个后端应当处于激活状态
    pub fn evaluate(&self) -> BackendKind {
        if let Some(value) = self.override_source.current() {
            match Preference::parse(&value) {
                Preference::Internal => {
                    debug!("override forces internal backend");
                    return BackendKind::Internal;
                }
                Preference::External => {
                    debug!("override forces external backend");
                    return BackendKind::External;
                }
                Preference::Auto => {
                    debug!(%value, "unrecognized override, falling back to presence probe");
                }
            }
        }

        if self.probe.is_present() {
            info!("external GPS present");
            BackendKind::External
        } else {
            info!("no external GPS found");
            BackendKind::Internal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn selector(
        override_value: Option<&str>,
        present: bool,
    ) -> SourceSelector {
        let value = override_value.map(str::to_string);
        SourceSelector::new(FnOverride(move || value.clone()), FnProbe(move || present))
    }

    #[test]
    fn test_override_internal_wins_over_probe() {
        assert_eq!(
            selector(Some("internal"), true).evaluate(),
            BackendKind::Internal
        );
    }

    #[test]
    fn test_override_external_wins_over_probe() {
        assert_eq!(
            selector(Some("external"), false).evaluate(),
            BackendKind::External
        );
    }

    #[test]
    fn test_no_override_maps_presence() {
        assert_eq!(selector(None, true).evaluate(), BackendKind::External);
        assert_eq!(selector(None, false).evaluate(), BackendKind::Internal);
    }

    #[test]
    fn test_unrecognized_override_falls_through_to_probe() {
        assert_eq!(
            selector(Some("EXTERNAL"), false).evaluate(),
            BackendKind::Internal
        );
        assert_eq!(selector(Some("auto"), true).evaluate(), BackendKind::External);
        assert_eq!(selector(Some(""), true).evaluate(), BackendKind::External);
    }

    #[test]
    fn test_probe_runs_on_every_evaluate() {
        // 在位状态可以在两次求值之间变化（dongle 运行中被拔掉）
        let present = Arc::new(AtomicBool::new(true));
        let probe_calls = Arc::new(AtomicUsize::new(0));

        let p = present.clone();
        let calls = probe_calls.clone();
        let sel = SourceSelector::new(
            FnOverride(|| None),
            FnProbe(move || {
                calls.fetch_add(1, Ordering::SeqCst);
                p.load(Ordering::SeqCst)
            }),
        );

        assert_eq!(sel.evaluate(), BackendKind::External);
        present.store(false, Ordering::SeqCst);
        assert_eq!(sel.evaluate(), BackendKind::Internal);
        assert_eq!(probe_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_probe_skipped_when_override_set() {
        let probe_calls = Arc::new(AtomicUsize::new(0));
        let calls = probe_calls.clone();
        let sel = SourceSelector::new(
            FnOverride(|| Some("internal".to_string())),
            FnProbe(move || {
                calls.fetch_add(1, Ordering::SeqCst);
                true
            }),
        );

        assert_eq!(sel.evaluate(), BackendKind::Internal);
        assert_eq!(probe_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_backend_kind_other() {
        assert_eq!(BackendKind::Internal.other(), BackendKind::External);
        assert_eq!(BackendKind::External.other(), BackendKind::Internal);
    }

    proptest! {
        /// 决策表：认识的 override 直接生效，其余一律跟随探测结果
        #[test]
        fn prop_selector_decision_table(
            override_value in proptest::option::of("[a-zA-Z]{0,10}"),
            present in any::<bool>(),
        ) {
            let expected = match override_value.as_deref() {
                Some("internal") => BackendKind::Internal,
                Some("external") => BackendKind::External,
                _ if present => BackendKind::External,
                _ => BackendKind::Internal,
            };
            prop_assert_eq!(
                selector(override_value.as_deref(), present).evaluate(),
                expected
            );
        }
    }
}
