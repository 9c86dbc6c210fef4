//! # `stockscope-indicator` - 技术指标
//!
//! 基于收盘价或 K 线序列的纯函数，无 I/O、无副作用、结果确定。
//! 需要 N 个样本的指标在样本不足时返回 None 或 `InsufficientData` 哨兵，绝不外推。

pub mod deviation;
pub mod kdj;
pub mod ma;
pub mod macd;
pub mod rsi;

use stockscope_core::indicator::entity::IndicatorSet;
use stockscope_core::market::entity::Bar;

pub use deviation::price_vs_ma;
pub use kdj::{KdjParams, kdj};
pub use ma::ma;
pub use macd::{SignalLine, ema, macd, macd_with};
pub use rsi::rsi;

/// # Summary
/// 基于 K 线序列计算完整指标集合。
///
/// # Logic
/// 1. 提取收盘价序列。
/// 2. 计算 MA5/10/20/60、RSI14、KDJ(9,3,3)、MACD(12,26)。
/// 3. 以最新价对比 MA5、MA10 得到偏离描述。
///
/// # Arguments
/// * `bars`: 按时间升序的 K 线。
/// * `current_price`: 最新成交价。
/// * `signal_line`: MACD 信号线算法。
///
/// # Returns
/// 指标集合，各字段按自身窗口独立判断是否可用。
pub fn compute_indicator_set(bars: &[Bar], current_price: f64, signal_line: SignalLine) -> IndicatorSet {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let ma5 = ma(&closes, 5);
    let ma10 = ma(&closes, 10);

    IndicatorSet {
        ma5,
        ma10,
        ma20: ma(&closes, 20),
        ma60: ma(&closes, 60),
        rsi14: rsi(&closes, rsi::DEFAULT_PERIOD),
        kdj: kdj(bars, KdjParams::default()),
        macd: macd_with(&closes, signal_line),
        price_vs_ma5: price_vs_ma(current_price, ma5),
        price_vs_ma10: price_vs_ma(current_price, ma10),
    }
}
