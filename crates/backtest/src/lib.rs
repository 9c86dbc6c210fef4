//! # `stockscope-backtest` - 预测回测
//!
//! 以最新行情核对历史预测的方向是否正确，输出逐条结果与整体胜率。

pub mod tracker;

pub use tracker::{BacktestTracker, score};
