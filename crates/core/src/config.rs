use crate::common::Sampling;
use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub pacing: PacingConfig,
    pub history: HistoryConfig,
    pub backtest: BacktestConfig,
    pub log: LogConfig,
}

/// 外部行情接口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    // 实时行情接口根地址
    pub quote_base_url: String,
    // 历史 K 线接口根地址
    pub history_base_url: String,
    // 资金流向接口根地址
    pub capital_flow_base_url: String,
    // 单次请求超时（秒）
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// 请求限速配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    // 每秒允许的请求数
    pub requests_per_second: f64,
    // 令牌桶容量
    pub burst: u32,
    // 扩展数据并发处理的标的数
    pub concurrency: usize,
}

/// 扩展数据使用的历史窗口
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub bar_count: usize,
    pub sampling: Sampling,
    // 计算技术指标所需的最少 K 线数
    pub min_bars: usize,
    // MACD 信号线 EMA 周期，None 时使用 DEA = DIF * 0.2
    pub macd_signal_period: Option<usize>,
}

/// 预测回测配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    // 分析结果目录
    pub analysis_dir: String,
    // 最多核对的分析文件数
    pub max_files: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    // 默认过滤级别，RUST_LOG 优先
    pub level: String,
    // 滚动日志目录，None 时只输出到终端
    pub dir: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            quote_base_url: "http://hq.sinajs.cn".to_string(),
            history_base_url: "https://quotes.sina.cn".to_string(),
            capital_flow_base_url: "http://push2.eastmoney.com".to_string(),
            timeout_secs: 10,
            user_agent: "Mozilla/5.0".to_string(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            // 约 300ms 一次
            requests_per_second: 1000.0 / 300.0,
            burst: 1,
            concurrency: 1,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            bar_count: 60,
            sampling: Sampling::Day1,
            min_bars: 20,
            macd_signal_period: None,
        }
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            analysis_dir: "analysis-results".to_string(),
            max_files: 20,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}
