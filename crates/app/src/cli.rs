use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stockscope_core::common::{InstrumentCode, Sampling};

#[derive(Parser, Debug)]
#[command(name = "stockscope", about = "A 股行情采集、技术指标与预测回测")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 批量获取实时行情
    Quote {
        #[arg(required = true)]
        codes: Vec<InstrumentCode>,
    },
    /// 获取单个标的的历史 K 线
    History {
        code: InstrumentCode,
        // 默认取配置中的 bar_count
        #[arg(long)]
        bars: Option<usize>,
        #[arg(long)]
        sampling: Option<Sampling>,
    },
    /// 行情 + 技术指标 + 资金流向
    Extended {
        #[arg(required = true)]
        codes: Vec<InstrumentCode>,
    },
    /// 以最新行情核对历史预测
    Backtest {
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        max_files: Option<usize>,
    },
}
