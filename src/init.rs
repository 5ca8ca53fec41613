use anyhow::{Context, Result};
use log::LevelFilter;

/// 程式啟動時設定一次日誌，`RUST_LOG` 可覆寫命令列的等級
pub fn init(level: LevelFilter) -> Result<()> {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_secs()
        .try_init()
        .context("無法初始化日誌")
}
