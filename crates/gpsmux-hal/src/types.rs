//! HAL 共享数据类型
//!
//! 数值取值与传统 GPS HAL 头文件保持一致（状态码、定位模式、
//! 辅助数据位标志），方便与既有固件侧约定对接。

use num_enum::{FromPrimitive, TryFromPrimitive};

/// UTC 时间戳（毫秒，自 epoch 起）
pub type GpsUtcTime = i64;

/// 一次定位结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// 预计水平精度（米）
    pub accuracy: f32,
}

/// 引擎/会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromPrimitive)]
#[repr(u16)]
pub enum GpsStatus {
    #[default]
    None = 0,
    SessionBegin = 1,
    SessionEnd = 2,
    EngineOn = 3,
    EngineOff = 4,
}

/// 定位模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive)]
#[repr(u32)]
pub enum PositionMode {
    /// 独立定位（无辅助）
    #[default]
    Standalone = 0,
    /// 基站辅助（MS-Based）
    MsBased = 1,
    /// 基站解算（MS-Assisted）
    MsAssisted = 2,
}

/// 定位上报模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive)]
#[repr(u32)]
pub enum PositionRecurrence {
    /// 周期性上报
    #[default]
    Periodic = 0,
    /// 单次定位
    Single = 1,
}

/// `set_position_mode` 的参数包
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionModeParams {
    pub mode: PositionMode,
    pub recurrence: PositionRecurrence,
    /// 最小上报间隔（毫秒）
    pub min_interval_ms: u32,
    /// 期望精度（米）
    pub preferred_accuracy_m: u32,
    /// 期望首次定位时间（毫秒）
    pub preferred_time_ms: u32,
}

/// 辅助数据位标志集合
///
/// 位定义沿用 HAL 的 `GPS_DELETE_*` 常量。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AidingData(pub u32);

impl AidingData {
    pub const EPHEMERIS: AidingData = AidingData(0x0001);
    pub const ALMANAC: AidingData = AidingData(0x0002);
    pub const POSITION: AidingData = AidingData(0x0004);
    pub const TIME: AidingData = AidingData(0x0008);
    pub const IONO: AidingData = AidingData(0x0010);
    pub const UTC: AidingData = AidingData(0x0020);
    pub const HEALTH: AidingData = AidingData(0x0040);
    pub const SVDIR: AidingData = AidingData(0x0080);
    pub const SVSTEER: AidingData = AidingData(0x0100);
    pub const SADATA: AidingData = AidingData(0x0200);
    pub const RTI: AidingData = AidingData(0x0400);
    pub const CELLDB_INFO: AidingData = AidingData(0x8000);
    pub const ALL: AidingData = AidingData(0xFFFF_FFFF);

    pub const fn empty() -> Self {
        AidingData(0)
    }

    pub const fn contains(self, other: AidingData) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: AidingData) -> Self {
        AidingData(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for AidingData {
    type Output = AidingData;

    fn bitor(self, rhs: AidingData) -> AidingData {
        self.union(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn test_aiding_data_bit_values() {
        // 与 HAL 头文件的 GPS_DELETE_* 常量一致
        assert_eq!(AidingData::EPHEMERIS.0, 0x0001);
        assert_eq!(AidingData::ALMANAC.0, 0x0002);
        assert_eq!(AidingData::POSITION.0, 0x0004);
        assert_eq!(AidingData::TIME.0, 0x0008);
        assert_eq!(AidingData::CELLDB_INFO.0, 0x8000);
        assert_eq!(AidingData::ALL.0, 0xFFFF_FFFF);
    }

    #[test]
    fn test_aiding_data_set_operations() {
        let flags = AidingData::EPHEMERIS | AidingData::ALMANAC;
        assert!(flags.contains(AidingData::EPHEMERIS));
        assert!(flags.contains(AidingData::ALMANAC));
        assert!(!flags.contains(AidingData::TIME));
        assert!(AidingData::ALL.contains(flags));
        assert!(AidingData::empty().is_empty());
        assert!(!flags.is_empty());
    }

    #[test]
    fn test_position_mode_from_raw() {
        assert_eq!(PositionMode::try_from(0u32), Ok(PositionMode::Standalone));
        assert_eq!(PositionMode::try_from(1u32), Ok(PositionMode::MsBased));
        assert_eq!(PositionMode::try_from(2u32), Ok(PositionMode::MsAssisted));
        assert!(PositionMode::try_from(3u32).is_err());
    }

    #[test]
    fn test_gps_status_from_raw_defaults_to_none() {
        assert_eq!(GpsStatus::from(1u16), GpsStatus::SessionBegin);
        assert_eq!(GpsStatus::from(4u16), GpsStatus::EngineOff);
        // 未知状态码降级为 None，而不是报错
        assert_eq!(GpsStatus::from(99u16), GpsStatus::None);
    }
}
