mod cli;
mod logging;
mod settings;

use clap::Parser;
use cli::{Cli, Command};
use serde::Serialize;
use std::sync::Arc;
use stockscope_backtest::BacktestTracker;
use stockscope_core::config::AppConfig;
use stockscope_core::market::port::{HistorySource, QuoteSource};
use stockscope_core::store::port::PredictionSource;
use stockscope_feed::capital_flow::CapitalFlowClient;
use stockscope_feed::history::HistoryClient;
use stockscope_feed::quote::QuoteClient;
use stockscope_market::{AssemblerOptions, ExtendedDataAssembler, TokenBucket};
use stockscope_store::JsonPredictionStore;
use tracing::info;

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化具体的数据源、限速器与存储，并通过 Arc<dyn Trait> 注入到各个服务。
///
/// # Logic
/// 1. 解析命令行并加载配置。
/// 2. 初始化全局日志（保持文件写入守卫存活）。
/// 3. 按子命令组装依赖并执行，结果以 JSON 输出到 stdout。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = settings::load()?;
    let _log_guard = logging::init(&config.log)?;
    info!("Stockscope starting...");

    match cli.command {
        Command::Quote { codes } => {
            let quotes = QuoteClient::new(&config.feed)?;
            print_json(&quotes.get_quotes(&codes).await)?;
        }
        Command::History {
            code,
            bars,
            sampling,
        } => {
            let history = HistoryClient::new(&config.feed)?;
            let bars = history
                .get_history(
                    &code,
                    bars.unwrap_or(config.history.bar_count),
                    sampling.unwrap_or(config.history.sampling),
                )
                .await;
            print_json(&bars)?;
        }
        Command::Extended { codes } => {
            let assembler = build_assembler(&config)?;
            print_json(&assembler.assemble(&codes).await)?;
        }
        Command::Backtest { dir, max_files } => {
            let dir = dir.unwrap_or_else(|| config.backtest.analysis_dir.clone().into());
            let store = JsonPredictionStore::new(dir, max_files.unwrap_or(config.backtest.max_files));
            let tracker = BacktestTracker::new(Arc::new(QuoteClient::new(&config.feed)?));
            run_backtest(&store, &tracker).await?;
        }
    }

    Ok(())
}

fn build_assembler(config: &AppConfig) -> anyhow::Result<ExtendedDataAssembler> {
    Ok(ExtendedDataAssembler::new(
        Arc::new(QuoteClient::new(&config.feed)?),
        Arc::new(HistoryClient::new(&config.feed)?),
        Arc::new(CapitalFlowClient::new(&config.feed)?),
        Arc::new(TokenBucket::from_config(&config.pacing)),
        AssemblerOptions::from_config(&config.history, &config.pacing),
    ))
}

/// # Summary
/// 加载预测并执行回测，逐条记录结果与整体胜率。
async fn run_backtest(
    store: &dyn PredictionSource,
    tracker: &BacktestTracker,
) -> anyhow::Result<()> {
    let predictions = store.load_predictions().await?;
    if predictions.is_empty() {
        info!("Backtest: no predictions to check");
        return Ok(());
    }

    let report = tracker.run(&predictions).await;
    info!("代码\t名称\t预测日期\t建议\t预测价\t当前价\t收益率\t表现");
    for outcome in &report.outcomes {
        info!("{}", outcome);
    }
    match report.win_rate() {
        Some(rate) => info!(
            "整体回测胜率: {:.2}% ({}/{}，平 {})",
            rate,
            report.wins(),
            report.wins() + report.losses(),
            report.neutrals()
        ),
        None => info!("没有可判定胜负的预测 (平 {})", report.neutrals()),
    }

    print_json(&report)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
