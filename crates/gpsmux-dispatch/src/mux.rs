//! 调度器
//!
//! 对外的 [`GpsMux`] 结构体：持有两个后端句柄和会话状态，把每个
//! 定位操作路由到当前权威后端，并在 start/stop 边界上检测并执行
//! 后端热切换。
//!
//! 切换序列（检测 → cleanup 旧后端 → init 新后端 → 运行中则补发
//! start → 转发本次操作）整体处于同一把锁内，并发调用方不可能
//! 观察到半完成的切换。

use crate::builder::GpsMuxBuilder;
use crate::error::DispatchError;
use crate::session::{SessionSnapshot, SessionState};
use crate::source::{BackendKind, SourceSelector};
use gpsmux_hal::{
    AidingData, Extension, GpsBackend, GpsUtcTime, PositionModeParams, SharedCallbacks,
};
use parking_lot::Mutex;
use tracing::{error, info, trace, warn};

/// 工厂交付的两个后端句柄，任何一个都可能缺失
pub(crate) struct BackendSet {
    pub(crate) internal: Option<Box<dyn GpsBackend + Send>>,
    pub(crate) external: Option<Box<dyn GpsBackend + Send>>,
}

impl BackendSet {
    fn get_mut(
        &mut self,
        kind: BackendKind,
    ) -> Result<&mut Box<dyn GpsBackend + Send>, DispatchError> {
        let slot = match kind {
            BackendKind::Internal => self.internal.as_mut(),
            BackendKind::External => self.external.as_mut(),
        };
        slot.ok_or(DispatchError::BackendUnavailable(kind))
    }

    fn has(&self, kind: BackendKind) -> bool {
        match kind {
            BackendKind::Internal => self.internal.is_some(),
            BackendKind::External => self.external.is_some(),
        }
    }
}

struct MuxInner {
    handles: BackendSet,
    session: SessionState,
}

/// 双后端 GPS 调度器（对外 API）
///
/// 所有公开方法都在内部互斥锁下执行，包括切换检测加转发的完整
/// 序列，可以被多线程并发调用。
///
/// # Example
///
/// ```no_run
/// use gpsmux_dispatch::{FnOverride, FnProbe, GpsMux};
///
/// let mux = GpsMux::builder()
///     .override_source(FnOverride(|| Some("internal".into())))
///     .presence_probe(FnProbe(|| false))
///     .build();
/// assert_eq!(mux.active_backend().to_string(), "internal");
/// ```
pub struct GpsMux {
    inner: Mutex<MuxInner>,
    selector: SourceSelector,
}

impl GpsMux {
    pub fn builder() -> GpsMuxBuilder {
        GpsMuxBuilder::new()
    }

    pub(crate) fn new(handles: BackendSet, selector: SourceSelector) -> Self {
        // 构造时求值一次，确定初始权威后端
        let active = selector.evaluate();
        info!(backend = %active, "gpsmux created");
        Self {
            inner: Mutex::new(MuxInner {
                handles,
                session: SessionState::new(active),
            }),
            selector,
        }
    }

    /// 当前权威后端
    pub fn active_backend(&self) -> BackendKind {
        self.inner.lock().session.active
    }

    /// 会话状态快照
    pub fn session(&self) -> SessionSnapshot {
        self.inner.lock().session.snapshot()
    }

    /// 初始化定位会话
    ///
    /// 重新求值定位源选出初始后端，登记回调集并转发 `init`。
    /// 不会开始定位。
    pub fn init(&self, callbacks: SharedCallbacks) -> Result<(), DispatchError> {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;

        let kind = self.selector.evaluate();
        inner.session.active = kind;
        info!(backend = %kind, "gpsmux init");

        inner.handles.get_mut(kind)?.init(callbacks.clone())?;
        inner.session.callbacks = Some(callbacks);
        inner.session.initialized = true;
        inner.session.started = false;
        Ok(())
    }

    /// 开始定位
    ///
    /// 转发之前先做一次切换检测：定位源发生变化时，本次 `start`
    /// 会落在切换后的新后端上。
    pub fn start(&self) -> Result<(), DispatchError> {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;

        if !inner.session.initialized {
            return Err(DispatchError::NotInitialized);
        }

        Self::detect_and_apply_switch(&self.selector, inner)?;

        let kind = inner.session.active;
        trace!(backend = %kind, "forward start");
        inner.handles.get_mut(kind)?.start()?;
        inner.session.started = true;
        Ok(())
    }

    /// 停止定位
    ///
    /// 先在实际运行的后端上转发 `stop`，之后才做切换检测——
    /// 即将被换下的设备必须先被正确停掉。
    pub fn stop(&self) -> Result<(), DispatchError> {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;

        if !inner.session.initialized {
            return Err(DispatchError::NotInitialized);
        }

        let kind = inner.session.active;
        trace!(backend = %kind, "forward stop");
        inner.handles.get_mut(kind)?.stop()?;
        inner.session.started = false;

        Self::detect_and_apply_switch(&self.selector, inner)?;
        Ok(())
    }

    /// 释放当前后端，会话回到未初始化状态
    ///
    /// 不改变权威后端的选择结果。
    pub fn cleanup(&self) -> Result<(), DispatchError> {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;

        let kind = inner.session.active;
        trace!(backend = %kind, "forward cleanup");
        inner.handles.get_mut(kind)?.cleanup()?;
        inner.session.reset();
        Ok(())
    }

    /// 注入参考时间（纯转发）
    pub fn inject_time(
        &self,
        time: GpsUtcTime,
        reference: i64,
        uncertainty_ms: i32,
    ) -> Result<(), DispatchError> {
        let mut inner = self.inner.lock();
        let kind = inner.session.active;
        trace!(backend = %kind, "forward inject_time");
        inner
            .handles
            .get_mut(kind)?
            .inject_time(time, reference, uncertainty_ms)?;
        Ok(())
    }

    /// 注入参考位置（纯转发）
    pub fn inject_location(
        &self,
        latitude: f64,
        longitude: f64,
        accuracy_m: f32,
    ) -> Result<(), DispatchError> {
        let mut inner = self.inner.lock();
        let kind = inner.session.active;
        trace!(backend = %kind, "forward inject_location");
        inner
            .handles
            .get_mut(kind)?
            .inject_location(latitude, longitude, accuracy_m)?;
        Ok(())
    }

    /// 删除辅助数据（纯转发）
    pub fn delete_aiding_data(&self, flags: AidingData) -> Result<(), DispatchError> {
        let mut inner = self.inner.lock();
        let kind = inner.session.active;
        trace!(backend = %kind, "forward delete_aiding_data");
        inner.handles.get_mut(kind)?.delete_aiding_data(flags)?;
        Ok(())
    }

    /// 配置定位模式（纯转发）
    pub fn set_position_mode(&self, params: PositionModeParams) -> Result<(), DispatchError> {
        let mut inner = self.inner.lock();
        let kind = inner.session.active;
        trace!(backend = %kind, "forward set_position_mode");
        inner.handles.get_mut(kind)?.set_position_mode(params)?;
        Ok(())
    }

    /// 查询当前后端的扩展能力（纯转发）
    pub fn get_extension(&self, name: &str) -> Result<Option<Extension>, DispatchError> {
        let mut inner = self.inner.lock();
        let kind = inner.session.active;
        trace!(backend = %kind, name, "forward get_extension");
        Ok(inner.handles.get_mut(kind)?.get_extension(name))
    }

    /// 切换检测与执行
    ///
    /// 定位源与当前后端一致时不产生任何后端调用。检测到变化时：
    /// 先确认新后端句柄存在（缺失则报错并保持旧会话原样），然后
    /// cleanup 旧后端、用同一份回调 init 新后端，会话处于运行态时
    /// 再补发 start。新后端 init/start 失败即 [`DispatchError::SwitchFailed`]，
    /// 不回滚（旧后端已释放），会话降级为未初始化。
    fn detect_and_apply_switch(
        selector: &SourceSelector,
        inner: &mut MuxInner,
    ) -> Result<bool, DispatchError> {
        let old = inner.session.active;
        let new = selector.evaluate();
        if new == old {
            trace!(backend = %old, "no device switch needed");
            return Ok(false);
        }

        let callbacks = inner
            .session
            .callbacks
            .clone()
            .ok_or(DispatchError::NotInitialized)?;

        if !inner.handles.has(new) {
            warn!(from = %old, to = %new, "switch target backend unavailable, keeping current");
            return Err(DispatchError::BackendUnavailable(new));
        }

        info!(from = %old, to = %new, "switching GPS backend");

        if let Err(e) = inner.handles.get_mut(old)?.cleanup() {
            warn!(backend = %old, error = %e, "cleanup of outgoing backend failed");
        }

        inner.session.active = new;
        let was_started = inner.session.started;

        let handle = inner.handles.get_mut(new)?;
        if let Err(e) = handle.init(callbacks) {
            error!(from = %old, to = %new, error = %e, "switch failed: new backend init");
            inner.session.reset();
            return Err(DispatchError::SwitchFailed {
                from: old,
                to: new,
                source: e,
            });
        }

        if was_started {
            if let Err(e) = handle.start() {
                error!(from = %old, to = %new, error = %e, "switch failed: new backend start");
                inner.session.reset();
                return Err(DispatchError::SwitchFailed {
                    from: old,
                    to: new,
                    source: e,
                });
            }
        }

        Ok(true)
    }
}
