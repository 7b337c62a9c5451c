//! 热切换演示命令
//!
//! 在两个 mock 后端上跑完整的 init → start → stop → 切换流程，
//! 结束后打印两个后端实际收到的调用流水。拔插外接设备用
//! `--toggle-presence` 模拟：每个周期结束时翻转一次在位状态。

use anyhow::{Result, anyhow};
use clap::Args;
use gpsmux_dispatch::{BackendKind, FnOverride, FnProbe, GpsMux};
use gpsmux_hal::mock::MockGpsBackend;
use gpsmux_hal::{
    GpsEventSink, GpsStatus, Location, PositionMode, PositionModeParams, PositionRecurrence,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::config::CliConfig;

/// mock 后端上的完整会话演示
#[derive(Args, Debug)]
pub struct DemoCommand {
    /// start/stop 周期数
    #[arg(short, long, default_value_t = 3)]
    cycles: u32,

    /// 每个周期结束时翻转外接设备在位状态（触发热切换）
    #[arg(long)]
    toggle_presence: bool,

    /// 定位模式原始值（0=standalone, 1=ms-based, 2=ms-assisted）
    #[arg(long, default_value_t = 0)]
    mode: u32,

    /// 周期间隔（毫秒）
    #[arg(long, default_value_t = 500)]
    interval_ms: u32,
}

struct PrintSink;

impl GpsEventSink for PrintSink {
    fn on_location(&self, location: Location) {
        println!(
            "📍 lat={:.5} lon={:.5} acc={:.1}m",
            location.latitude, location.longitude, location.accuracy
        );
    }

    fn on_status(&self, status: GpsStatus) {
        println!("   status: {:?}", status);
    }
}

impl DemoCommand {
    pub fn execute(self) -> Result<()> {
        let mode = PositionMode::try_from(self.mode)
            .map_err(|_| anyhow!("invalid position mode: {}", self.mode))?;

        let journal = Arc::new(Mutex::new(Vec::new()));
        let internal = MockGpsBackend::new("internal", journal.clone());
        let external = MockGpsBackend::new("external", journal.clone());
        let internal_slot = internal.callback_slot();
        let external_slot = external.callback_slot();

        let presence = Arc::new(AtomicBool::new(false));
        let p = presence.clone();
        let mux = GpsMux::builder()
            .internal(internal)
            .external(external)
            .override_source(FnOverride(|| CliConfig::load().ok().and_then(|c| c.backend)))
            .presence_probe(FnProbe(move || p.load(Ordering::SeqCst)))
            .build();

        let running = Arc::new(AtomicBool::new(true));
        let r = running.clone();
        ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))?;

        mux.init(Arc::new(PrintSink))?;
        mux.set_position_mode(PositionModeParams {
            mode,
            recurrence: PositionRecurrence::Periodic,
            min_interval_ms: self.interval_ms,
            ..Default::default()
        })?;

        for cycle in 0..self.cycles {
            if !running.load(Ordering::SeqCst) {
                println!("interrupted, stopping demo");
                break;
            }

            mux.start()?;
            let active = mux.active_backend();
            println!("cycle {} on {} backend", cycle + 1, active);

            // 向当前权威后端的回调槽发一条模拟定位
            let slot = match active {
                BackendKind::Internal => &internal_slot,
                BackendKind::External => &external_slot,
            };
            if let Some(callbacks) = slot.lock().clone() {
                callbacks.on_status(GpsStatus::SessionBegin);
                callbacks.on_location(Location {
                    latitude: 59.334 + f64::from(cycle) * 0.001,
                    longitude: 18.063,
                    accuracy: 12.5,
                });
            }

            std::thread::sleep(Duration::from_millis(u64::from(self.interval_ms)));
            mux.stop()?;

            if self.toggle_presence {
                let flipped = !presence.load(Ordering::SeqCst);
                presence.store(flipped, Ordering::SeqCst);
                println!(
                    "external device now {}",
                    if flipped { "present" } else { "absent" }
                );
            }
        }

        mux.cleanup()?;

        println!("--- call journal ---");
        for call in journal.lock().iter() {
            println!("{:>8}  {:?}", call.backend, call.op);
        }
        Ok(())
    }
}
