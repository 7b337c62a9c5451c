//! 选择器查询命令

use anyhow::Result;
use clap::Args;
use gpsmux_dispatch::{DevicePathProbe, FnOverride, Preference, PresenceProbe, SourceSelector};

use super::config::CliConfig;

/// 显示此刻的后端选择结果及其依据
#[derive(Args, Debug)]
pub struct SelectCommand {
    /// 临时指定外接设备节点（默认取配置，再默认 /dev/ttyACM0）
    #[arg(short, long)]
    device_path: Option<String>,
}

impl SelectCommand {
    pub fn execute(self) -> Result<()> {
        let config = CliConfig::load()?;
        let device_path = self
            .device_path
            .or(config.device_path.clone())
            .unwrap_or_else(|| DevicePathProbe::DEFAULT_DEVICE.to_string());

        let probe = DevicePathProbe::new(&device_path);
        let present = probe.is_present();
        let preference = Preference::parse_opt(config.backend.as_deref());

        let selector = SourceSelector::new(
            FnOverride(move || CliConfig::load().ok().and_then(|c| c.backend)),
            probe,
        );
        let verdict = selector.evaluate();

        println!("backend: {}", verdict);
        match preference {
            Preference::Internal | Preference::External => {
                println!("reason:  override ({})", config.backend.as_deref().unwrap_or(""));
            }
            Preference::Auto => {
                println!(
                    "reason:  probe {} ({})",
                    device_path,
                    if present { "present" } else { "absent" }
                );
            }
        }
        Ok(())
    }
}
