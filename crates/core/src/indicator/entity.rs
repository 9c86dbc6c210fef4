use serde::{Deserialize, Serialize};
use std::fmt;

/// # Summary
/// KDJ 信号。
///
/// # Invariants
/// - `InsufficientData` 仅在 K 线数量少于周期 N 时出现。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KdjSignal {
    GoldenCross,
    DeathCross,
    Overbought,
    Oversold,
    Neutral,
    InsufficientData,
}

impl fmt::Display for KdjSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            KdjSignal::GoldenCross => "金叉",
            KdjSignal::DeathCross => "死叉",
            KdjSignal::Overbought => "超买",
            KdjSignal::Oversold => "超卖",
            KdjSignal::Neutral => "中性",
            KdjSignal::InsufficientData => "数据不足",
        };
        f.write_str(label)
    }
}

/// # Summary
/// KDJ 指标读数。
///
/// # Invariants
/// - 信号为 `InsufficientData` 时三个数值均为 None，反之均为 Some。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kdj {
    pub k: Option<f64>,
    pub d: Option<f64>,
    pub j: Option<f64>,
    pub signal: KdjSignal,
}

impl Kdj {
    /// 数据不足时的哨兵值
    pub fn insufficient() -> Self {
        Self {
            k: None,
            d: None,
            j: None,
            signal: KdjSignal::InsufficientData,
        }
    }
}

/// # Summary
/// MACD 信号。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdSignal {
    Bullish,
    GoldenCross,
    Bearish,
    DeathCross,
    Oscillating,
    InsufficientData,
}

impl fmt::Display for MacdSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MacdSignal::Bullish => "多头",
            MacdSignal::GoldenCross => "金叉",
            MacdSignal::Bearish => "空头",
            MacdSignal::DeathCross => "死叉",
            MacdSignal::Oscillating => "震荡",
            MacdSignal::InsufficientData => "数据不足",
        };
        f.write_str(label)
    }
}

/// # Summary
/// MACD 指标读数。
///
/// # Invariants
/// - 信号为 `InsufficientData` 时 `dif` / `dea` / `macd` 均为 None。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    pub dif: Option<f64>,
    pub dea: Option<f64>,
    pub macd: Option<f64>,
    pub signal: MacdSignal,
}

impl Macd {
    /// 数据不足时的哨兵值
    pub fn insufficient() -> Self {
        Self {
            dif: None,
            dea: None,
            macd: None,
            signal: MacdSignal::InsufficientData,
        }
    }
}

/// # Summary
/// 现价相对均线的偏离。
///
/// # Invariants
/// - 偏离绝对值小于 0.5% 视为持平。
/// - `Above` / `Below` 携带的百分比已保留两位小数，`Below` 为负值。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "position", content = "percent", rename_all = "snake_case")]
pub enum MaDeviation {
    Flat,
    Above(f64),
    Below(f64),
}

impl fmt::Display for MaDeviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaDeviation::Flat => f.write_str("持平"),
            MaDeviation::Above(p) => write!(f, "+{:.2}%", p),
            MaDeviation::Below(p) => write!(f, "{:.2}%", p),
        }
    }
}

/// # Summary
/// 单个标的的技术指标集合。
///
/// # Invariants
/// - 需要 N 根 K 线的指标在数据不足 N 根时为 None 或哨兵，绝不外推。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub ma20: Option<f64>,
    pub ma60: Option<f64>,
    // 14 日 RSI，取值 [0, 100]
    pub rsi14: Option<f64>,
    pub kdj: Kdj,
    pub macd: Macd,
    pub price_vs_ma5: Option<MaDeviation>,
    pub price_vs_ma10: Option<MaDeviation>,
}

impl Default for IndicatorSet {
    fn default() -> Self {
        Self {
            ma5: None,
            ma10: None,
            ma20: None,
            ma60: None,
            rsi14: None,
            kdj: Kdj::insufficient(),
            macd: Macd::insufficient(),
            price_vs_ma5: None,
            price_vs_ma10: None,
        }
    }
}

impl IndicatorSet {
    /// 是否所有数值字段都不可用
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
