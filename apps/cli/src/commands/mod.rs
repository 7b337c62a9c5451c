//! CLI 子命令

pub mod config;
pub mod demo;
pub mod select;
