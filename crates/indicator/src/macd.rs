//! MACD (Moving Average Convergence Divergence)。
//!
//! DIF = EMA(12) - EMA(26)，EMA 以首个价格为初值，`k = 2 / (period + 1)`。
//! 柱值 MACD = (DIF - DEA) * 2。
//!
//! DEA 默认采用简化算法 `DEA = DIF * 0.2`，与常规定义（DIF 的 9 日 EMA）不同；
//! 需要标准信号线时显式传入 [`SignalLine::Ema`]。

use stockscope_core::common::count_as_f64;
use stockscope_core::indicator::entity::{Macd, MacdSignal};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

const SIMPLIFIED_DEA_RATIO: f64 = 0.2;

/// # Summary
/// DEA 信号线算法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalLine {
    /// DEA = DIF * 0.2
    #[default]
    Simplified,
    /// DEA = DIF 序列的 N 日 EMA
    Ema(usize),
}

/// # Summary
/// 计算整段序列每一期的 EMA。
///
/// # Returns
/// 与输入等长的序列；输入为空或 `period` 为 0 时返回空。
pub fn ema_series(prices: &[f64], period: usize) -> Vec<f64> {
    let Some(&first) = prices.first() else {
        return Vec::new();
    };
    if period == 0 {
        return Vec::new();
    }

    let k = 2.0 / (count_as_f64(period) + 1.0);
    let mut current = first;
    let mut out = Vec::with_capacity(prices.len());
    out.push(current);
    for &price in &prices[1..] {
        current = price * k + current * (1.0 - k);
        out.push(current);
    }
    out
}

/// # Summary
/// 最新一期 EMA。
///
/// # Returns
/// 价格数少于 `period` 时返回 None。
pub fn ema(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }
    ema_series(prices, period).last().copied()
}

/// 默认参数的 MACD（简化 DEA）
pub fn macd(prices: &[f64]) -> Macd {
    macd_with(prices, SignalLine::Simplified)
}

/// # Summary
/// 计算最新一期 MACD 及信号。
///
/// # Logic
/// 1. 价格不足 26 个返回 `InsufficientData` 哨兵。
/// 2. 按 `signal_line` 得到 DEA，柱值 = (DIF - DEA) * 2。
/// 3. 柱值 > 0：DIF > DEA 为多头，否则金叉；柱值 < 0：DIF < DEA 为空头，否则死叉；柱值为 0 为震荡。
///
/// # Arguments
/// * `prices`: 按时间升序的收盘价。
/// * `signal_line`: DEA 算法。
pub fn macd_with(prices: &[f64], signal_line: SignalLine) -> Macd {
    if prices.len() < DEFAULT_SLOW {
        return Macd::insufficient();
    }

    let fast = ema_series(prices, DEFAULT_FAST);
    let slow = ema_series(prices, DEFAULT_SLOW);
    let difs: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let Some(&dif) = difs.last() else {
        return Macd::insufficient();
    };

    let dea = match signal_line {
        SignalLine::Simplified => dif * SIMPLIFIED_DEA_RATIO,
        SignalLine::Ema(period) => match ema_series(&difs, period).last() {
            Some(&value) => value,
            None => return Macd::insufficient(),
        },
    };
    let histogram = (dif - dea) * 2.0;

    Macd {
        dif: Some(dif),
        dea: Some(dea),
        macd: Some(histogram),
        signal: classify(dif, dea, histogram),
    }
}

fn classify(dif: f64, dea: f64, histogram: f64) -> MacdSignal {
    if histogram > 0.0 {
        if dif > dea {
            MacdSignal::Bullish
        } else {
            MacdSignal::GoldenCross
        }
    } else if histogram < 0.0 {
        if dif < dea {
            MacdSignal::Bearish
        } else {
            MacdSignal::DeathCross
        }
    } else {
        MacdSignal::Oscillating
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ema_seeded_at_first_price() {
        // k = 2 / 3
        let series = ema_series(&[3.0, 6.0, 9.0], 2);
        assert_relative_eq!(series[0], 3.0);
        assert_relative_eq!(series[1], 5.0);
        assert_relative_eq!(series[2], 23.0 / 3.0);
        assert_relative_eq!(ema(&[3.0, 6.0, 9.0], 2).unwrap(), 23.0 / 3.0);
    }

    #[test]
    fn ema_none_when_short() {
        assert_eq!(ema(&[1.0, 2.0], 3), None);
        assert_eq!(ema(&[1.0], 0), None);
        assert!(ema_series(&[], 5).is_empty());
    }

    #[test]
    fn macd_insufficient_below_26() {
        let prices: Vec<f64> = (0..25).map(|i| 10.0 + f64::from(i)).collect();
        let result = macd(&prices);
        assert_eq!(result, Macd::insufficient());
        assert_eq!(result.signal, MacdSignal::InsufficientData);
    }

    #[test]
    fn macd_defined_at_26() {
        let prices: Vec<f64> = (0..26).map(|i| 10.0 + f64::from(i)).collect();
        let result = macd(&prices);
        let dif = result.dif.unwrap();
        assert!(dif > 0.0);
        assert_relative_eq!(result.dea.unwrap(), dif * 0.2);
        assert_relative_eq!(result.macd.unwrap(), (dif - dif * 0.2) * 2.0);
        assert_eq!(result.signal, MacdSignal::Bullish);
    }

    #[test]
    fn macd_falling_prices_bearish() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 - f64::from(i)).collect();
        let result = macd(&prices);
        assert!(result.dif.unwrap() < 0.0);
        assert_eq!(result.signal, MacdSignal::Bearish);
    }

    #[test]
    fn macd_flat_prices_oscillating() {
        let result = macd(&[10.0; 30]);
        assert_relative_eq!(result.dif.unwrap(), 0.0);
        assert_eq!(result.signal, MacdSignal::Oscillating);
    }

    #[test]
    fn macd_ema_signal_line_lags_dif() {
        // 持续上涨时 DIF 递增，DIF 的 EMA 落后于 DIF
        let prices: Vec<f64> = (0..40).map(|i| 10.0 + f64::from(i) * 0.5).collect();
        let result = macd_with(&prices, SignalLine::Ema(DEFAULT_SIGNAL));
        let dif = result.dif.unwrap();
        let dea = result.dea.unwrap();
        assert!(dea < dif);
        assert_relative_eq!(result.macd.unwrap(), (dif - dea) * 2.0);
        assert_eq!(result.signal, MacdSignal::Bullish);
    }

    #[test]
    fn macd_ema_signal_line_zero_period_is_insufficient() {
        let prices: Vec<f64> = (0..30).map(|i| 10.0 + f64::from(i)).collect();
        assert_eq!(macd_with(&prices, SignalLine::Ema(0)), Macd::insufficient());
    }

    #[test]
    fn classify_cross_states() {
        assert_eq!(classify(1.0, 2.0, 0.5), MacdSignal::GoldenCross);
        assert_eq!(classify(-1.0, -2.0, -0.5), MacdSignal::DeathCross);
    }
}
