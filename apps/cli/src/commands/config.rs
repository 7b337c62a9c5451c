//! 配置管理命令
//!
//! 后端偏好持久化在用户配置目录的 TOML 文件里，是传统系统属性
//! （`persist.sys.*`）的替代品。`select` / `demo` 每次求值都会
//! 重新读取该文件，运行中修改立即生效。

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 配置文件路径
fn config_dir() -> Result<PathBuf> {
    let mut path = dirs::config_dir().context("无法确定配置目录")?;
    path.push("gpsmux");
    Ok(path)
}

pub fn config_file() -> Result<PathBuf> {
    let mut path = config_dir()?;
    path.push("config.toml");
    Ok(path)
}

/// CLI 配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// 后端偏好：internal / external，其余值视为自动检测
    pub backend: Option<String>,

    /// 外接设备节点（默认 /dev/ttyACM0）
    pub device_path: Option<String>,
}

impl CliConfig {
    /// 从默认位置加载配置
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).context("读取配置文件失败")?;
        toml::from_str(&content).context("解析配置文件失败")
    }

    /// 保存到默认位置
    pub fn save(&self) -> Result<()> {
        let dir = config_dir()?;
        fs::create_dir_all(&dir).context("创建配置目录失败")?;
        self.save_to(&config_file()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("序列化配置失败")?;
        fs::write(path, content).context("写入配置文件失败")?;
        Ok(())
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项
    Set {
        /// 后端偏好（internal / external / auto）
        #[arg(short, long)]
        backend: Option<String>,

        /// 外接设备节点路径
        #[arg(short, long)]
        device_path: Option<String>,
    },

    /// 显示当前配置
    Get,

    /// 显示配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Set {
                backend,
                device_path,
            } => Self::set_(backend, device_path),
            ConfigCommand::Get => Self::get_(),
            ConfigCommand::Path => {
                println!("{}", config_file()?.display());
                Ok(())
            }
        }
    }

    fn set_(backend: Option<String>, device_path: Option<String>) -> Result<()> {
        let mut config = CliConfig::load()?;

        if let Some(ref b) = backend {
            config.backend = Some(b.clone());
            println!("✅ 设置后端偏好: {}", b);
        }

        if let Some(ref p) = device_path {
            config.device_path = Some(p.clone());
            println!("✅ 设置外接设备节点: {}", p);
        }

        config.save()
    }

    fn get_() -> Result<()> {
        let config = CliConfig::load()?;
        println!(
            "backend     = {}",
            config.backend.as_deref().unwrap_or("(auto)")
        );
        println!(
            "device_path = {}",
            config
                .device_path
                .as_deref()
                .unwrap_or(gpsmux_dispatch::DevicePathProbe::DEFAULT_DEVICE)
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = CliConfig {
            backend: Some("external".to_string()),
            device_path: Some("/dev/ttyUSB1".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = CliConfig::load_from(&path).unwrap();
        assert_eq!(loaded.backend.as_deref(), Some("external"));
        assert_eq!(loaded.device_path.as_deref(), Some("/dev/ttyUSB1"));
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = CliConfig::load_from(&dir.path().join("none.toml")).unwrap();
        assert!(loaded.backend.is_none());
        assert!(loaded.device_path.is_none());
    }
}
