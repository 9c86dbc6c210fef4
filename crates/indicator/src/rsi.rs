//! RSI (Relative Strength Index)。
//!
//! 取最近 `period` 个涨跌幅，平均涨幅 = 涨幅之和 / period，平均跌幅同理。
//! RSI = 100 - 100 / (1 + 平均涨幅 / 平均跌幅)；平均跌幅为 0 时 RSI = 100。

use stockscope_core::common::count_as_f64;

pub const DEFAULT_PERIOD: usize = 14;

/// # Summary
/// 计算最新一期 RSI。
///
/// # Arguments
/// * `prices`: 按时间升序的收盘价。
/// * `period`: 周期，常用 14。
///
/// # Returns
/// 价格数少于 `period + 1` 时返回 None，否则返回 [0, 100] 内的值。
pub fn rsi(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period + 1 {
        return None;
    }

    let window = &prices[prices.len() - period - 1..];
    let (gains, losses) = window
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(g, l), change| {
            if change > 0.0 {
                (g + change, l)
            } else {
                (g, l - change)
            }
        });

    let n = count_as_f64(period);
    let avg_gain = gains / n;
    let avg_loss = losses / n;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}
