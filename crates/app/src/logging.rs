use stockscope_core::config::LogConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_NAME: &str = "stockscope.log";

/// # Summary
/// 初始化全局日志。
///
/// # Logic
/// 1. `RUST_LOG` 存在时优先，否则使用配置的级别。
/// 2. 终端输出到 stderr，stdout 留给命令结果。
/// 3. 配置了目录时追加按天滚动的文件输出（非阻塞写入）。
///
/// # Returns
/// 文件输出的后台写入守卫，需在 main 结束前保持存活；未启用文件输出时为 None。
pub fn init(config: &LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;
    let console = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let Some(dir) = config.dir.as_deref() else {
        tracing_subscriber::registry()
            .with(filter)
            .with(console)
            .try_init()?;
        return Ok(None);
    };

    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init()?;
    Ok(Some(guard))
}
