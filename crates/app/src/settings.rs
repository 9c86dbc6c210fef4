use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use stockscope_core::config::AppConfig;

const DEFAULT_CONFIG_PATH: &str = "config/stockscope.toml";
const CONFIG_PATH_VAR: &str = "STOCKSCOPE_CONFIG";
const ENV_PREFIX: &str = "STOCKSCOPE";

/// # Summary
/// 加载应用配置。
///
/// # Logic
/// 1. 配置文件路径取 `STOCKSCOPE_CONFIG`，未设置时使用 `config/stockscope.toml`。
/// 2. 文件可选，不存在时全部使用默认值。
/// 3. `STOCKSCOPE__SECTION__KEY` 环境变量覆盖文件中的同名项。
///
/// # Returns
/// 合并后的配置，格式错误时返回 ConfigError。
pub fn load() -> Result<AppConfig, ConfigError> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    load_from(Path::new(&path))
}

pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}
