//! # 双后端 GPS 调度层
//!
//! 本模块在两个可互换的定位后端（内置 / 外接）之上提供单一的
//! 定位接口，包括：
//! - 定位源选择（持久化偏好优先，其次物理在位探测）
//! - 会话状态跟踪（init/start 标志与回调集）
//! - 后端热切换（cleanup 旧后端 → 以同一份回调 init 新后端 →
//!   会话运行中则补发 start），对消费者完全透明
//!
//! # 使用场景
//!
//! 设备同时带有内置定位芯片和可插拔外接定位模块，运行期根据
//! 配置偏好或外接设备在位状态动态选择权威后端。

mod builder;
mod error;
mod mux;
mod session;
pub mod source;

pub use builder::GpsMuxBuilder;
pub use error::DispatchError;
pub use mux::GpsMux;
pub use session::SessionSnapshot;
pub use source::{
    BackendKind, DevicePathProbe, EnvOverride, FnOverride, FnProbe, OverrideSource, Preference,
    PresenceProbe, SourceSelector,
};
