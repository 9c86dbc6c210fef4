//! 简单移动平均 (MA)。

use stockscope_core::common::count_as_f64;

/// # Summary
/// 最近 `period` 个价格的算术平均。
///
/// # Arguments
/// * `prices`: 按时间升序的价格序列。
/// * `period`: 窗口长度。
///
/// # Returns
/// 样本数少于 `period`（或 `period` 为 0）时返回 None。
pub fn ma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }
    let window = &prices[prices.len() - period..];
    Some(window.iter().sum::<f64>() / count_as_f64(period))
}
