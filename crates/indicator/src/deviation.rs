//! 现价相对均线的偏离。

use stockscope_core::indicator::entity::MaDeviation;

const FLAT_BAND_PERCENT: f64 = 0.5;

/// # Summary
/// 计算 `(price - ma) / ma * 100`，保留两位小数。
///
/// # Returns
/// 均线缺失或非正时返回 None；偏离绝对值小于 0.5 为持平。
pub fn price_vs_ma(price: f64, ma: Option<f64>) -> Option<MaDeviation> {
    let ma = ma.filter(|m| *m > 0.0)?;
    let percent = ((price - ma) / ma * 100.0 * 100.0).round() / 100.0;

    Some(if percent.abs() < FLAT_BAND_PERCENT {
        MaDeviation::Flat
    } else if percent > 0.0 {
        MaDeviation::Above(percent)
    } else {
        MaDeviation::Below(percent)
    })
}
