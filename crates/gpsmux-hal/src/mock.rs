//! Mock GPS 后端
//!
//! 无硬件依赖的测试替身：把收到的每一次操作按顺序记入共享的
//! [`CallJournal`]，供上层调度器的测试断言调用序列；支持按操作名
//! 注入失败，用于验证错误传播和切换失败路径。
//!
//! 两个 mock 实例共享同一个 journal（以 `label` 区分）时，可以对
//! "先 cleanup 旧后端、再 init 新后端" 这类跨后端顺序做精确断言。

use crate::types::{AidingData, GpsUtcTime, PositionModeParams};
use crate::{BackendFault, BackendFaultKind, Extension, GpsBackend, HalError, SharedCallbacks};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::trace;

/// 按时间顺序记录的操作流水
pub type CallJournal = Arc<Mutex<Vec<MockCall>>>;

/// 注入失败的操作名集合（共享句柄，测试中途可修改）
pub type FaultSet = Arc<Mutex<HashSet<&'static str>>>;

/// 一条流水记录：哪个后端收到了什么操作
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub backend: &'static str,
    pub op: MockOp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MockOp {
    Init,
    Start,
    Stop,
    Cleanup,
    InjectTime {
        time: GpsUtcTime,
        reference: i64,
        uncertainty_ms: i32,
    },
    InjectLocation {
        latitude: f64,
        longitude: f64,
        accuracy_m: f32,
    },
    DeleteAidingData(AidingData),
    SetPositionMode(PositionModeParams),
    GetExtension(String),
}

/// 记录型 mock 后端
pub struct MockGpsBackend {
    label: &'static str,
    journal: CallJournal,
    faults: FaultSet,
    /// 最近一次 init 收到的回调集（共享槽，外部可取出触发回调）
    callbacks: Arc<Mutex<Option<SharedCallbacks>>>,
    extensions: HashMap<String, Extension>,
    initialized: bool,
    started: bool,
}

impl MockGpsBackend {
    pub fn new(label: &'static str, journal: CallJournal) -> Self {
        Self {
            label,
            journal,
            faults: Arc::new(Mutex::new(HashSet::new())),
            callbacks: Arc::new(Mutex::new(None)),
            extensions: HashMap::new(),
            initialized: false,
            started: false,
        }
    }

    /// 让指定操作（"init"、"start" 等）永久失败，直到从故障集中移除
    pub fn with_fault(self, op: &'static str) -> Self {
        self.faults.lock().insert(op);
        self
    }

    /// 预置一个命名扩展能力
    pub fn with_extension(mut self, name: impl Into<String>, ext: Extension) -> Self {
        self.extensions.insert(name.into(), ext);
        self
    }

    /// 故障集句柄（boxed 之前克隆出来，测试中途增删故障）
    pub fn faults(&self) -> FaultSet {
        self.faults.clone()
    }

    /// 回调槽句柄（boxed 之前克隆出来，用于向消费者发事件或断言回调同一性）
    pub fn callback_slot(&self) -> Arc<Mutex<Option<SharedCallbacks>>> {
        self.callbacks.clone()
    }

    fn record(&self, op: MockOp) {
        trace!(backend = self.label, ?op, "mock backend call");
        self.journal.lock().push(MockCall {
            backend: self.label,
            op,
        });
    }

    fn check_fault(&self, op: &'static str) -> Result<(), HalError> {
        if self.faults.lock().contains(op) {
            return Err(HalError::Device(BackendFault::new(
                BackendFaultKind::Unknown,
                format!("{}: injected fault on {}", self.label, op),
            )));
        }
        Ok(())
    }
}

impl GpsBackend for MockGpsBackend {
    fn init(&mut self, callbacks: SharedCallbacks) -> Result<(), HalError> {
        self.record(MockOp::Init);
        self.check_fault("init")?;
        *self.callbacks.lock() = Some(callbacks);
        self.initialized = true;
        self.started = false;
        Ok(())
    }

    fn start(&mut self) -> Result<(), HalError> {
        self.record(MockOp::Start);
        self.check_fault("start")?;
        if !self.initialized {
            return Err(HalError::NotReady);
        }
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), HalError> {
        self.record(MockOp::Stop);
        self.check_fault("stop")?;
        if !self.initialized {
            return Err(HalError::NotReady);
        }
        self.started = false;
        Ok(())
    }

    fn cleanup(&mut self) -> Result<(), HalError> {
        self.record(MockOp::Cleanup);
        self.check_fault("cleanup")?;
        *self.callbacks.lock() = None;
        self.initialized = false;
        self.started = false;
        Ok(())
    }

    fn inject_time(
        &mut self,
        time: GpsUtcTime,
        reference: i64,
        uncertainty_ms: i32,
    ) -> Result<(), HalError> {
        self.record(MockOp::InjectTime {
            time,
            reference,
            uncertainty_ms,
        });
        self.check_fault("inject_time")
    }

    fn inject_location(
        &mut self,
        latitude: f64,
        longitude: f64,
        accuracy_m: f32,
    ) -> Result<(), HalError> {
        self.record(MockOp::InjectLocation {
            latitude,
            longitude,
            accuracy_m,
        });
        self.check_fault("inject_location")
    }

    fn delete_aiding_data(&mut self, flags: AidingData) -> Result<(), HalError> {
        self.record(MockOp::DeleteAidingData(flags));
        self.check_fault("delete_aiding_data")
    }

    fn set_position_mode(&mut self, params: PositionModeParams) -> Result<(), HalError> {
        self.record(MockOp::SetPositionMode(params));
        self.check_fault("set_position_mode")
    }

    fn get_extension(&self, name: &str) -> Option<Extension> {
        self.record(MockOp::GetExtension(name.to_string()));
        self.extensions.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GpsStatus, Location};
    use crate::GpsEventSink;

    struct NullSink;

    impl GpsEventSink for NullSink {
        fn on_location(&self, _location: Location) {}
        fn on_status(&self, _status: GpsStatus) {}
    }

    fn sink() -> SharedCallbacks {
        Arc::new(NullSink)
    }

    fn journal() -> CallJournal {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn test_mock_records_lifecycle_in_order() {
        let journal = journal();
        let mut backend = MockGpsBackend::new("internal", journal.clone());

        backend.init(sink()).unwrap();
        backend.start().unwrap();
        backend.stop().unwrap();
        backend.cleanup().unwrap();

        let ops: Vec<_> = journal.lock().iter().map(|c| c.op.clone()).collect();
        assert_eq!(
            ops,
            vec![MockOp::Init, MockOp::Start, MockOp::Stop, MockOp::Cleanup]
        );
    }

    #[test]
    fn test_mock_start_before_init_is_not_ready() {
        let mut backend = MockGpsBackend::new("internal", journal());
        assert!(matches!(backend.start(), Err(HalError::NotReady)));
    }

    #[test]
    fn test_mock_injected_fault() {
        let mut backend = MockGpsBackend::new("external", journal()).with_fault("init");
        let err = backend.init(sink()).unwrap_err();
        assert!(matches!(err, HalError::Device(_)));

        // 故障移除后恢复正常
        backend.faults().lock().remove("init");
        assert!(backend.init(sink()).is_ok());
    }

    #[test]
    fn test_mock_callback_slot_shares_same_arc() {
        let mut backend = MockGpsBackend::new("internal", journal());
        let slot = backend.callback_slot();
        let callbacks = sink();

        backend.init(callbacks.clone()).unwrap();
        let held = slot.lock().clone().unwrap();
        assert!(Arc::ptr_eq(&held, &callbacks));
    }

    #[test]
    fn test_mock_extension_lookup() {
        let marker: Extension = Arc::new(42u32);
        let backend =
            MockGpsBackend::new("external", journal()).with_extension("agps", marker.clone());

        let found = backend.get_extension("agps").unwrap();
        assert_eq!(found.downcast_ref::<u32>(), Some(&42));
        assert!(backend.get_extension("xtra").is_none());
    }
}
