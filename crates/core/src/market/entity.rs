use crate::common::InstrumentCode;
use crate::indicator::entity::IndicatorSet;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// # Summary
/// 实时行情快照实体。
///
/// # Invariants
/// - `change_percent` 由 `current` 与 `previous_close` 推导，任一非正时为 0。
/// - 数据源回落到 UTF-8 解码时 `name` 可能是乱码，数值字段不受影响。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    // 证券代码
    pub code: InstrumentCode,
    // 证券简称
    pub name: String,
    // 最新价
    pub current: f64,
    // 昨日收盘价
    pub previous_close: f64,
    // 今日开盘价
    pub open: f64,
    // 今日最高价
    pub high: f64,
    // 今日最低价
    pub low: f64,
    // 涨跌幅（百分比）
    pub change_percent: f64,
    // 成交量（股）
    pub volume: f64,
    // 成交额（元）
    pub amount: f64,
    // 行情日期，例如 2024-01-02
    pub date: String,
    // 行情时间，例如 15:00:03
    pub time: String,
}

impl Quote {
    /// # Summary
    /// 计算涨跌幅。
    ///
    /// # Logic
    /// 1. 昨收或最新价非正（开盘前、停牌、新股首日等）时返回 0。
    /// 2. 否则返回 `(current - previous_close) / previous_close * 100`。
    ///
    /// # Arguments
    /// * `current`: 最新价。
    /// * `previous_close`: 昨收价。
    ///
    /// # Returns
    /// 涨跌幅百分比。
    pub fn change_percent_of(current: f64, previous_close: f64) -> f64 {
        if previous_close > 0.0 && current > 0.0 {
            (current - previous_close) / previous_close * 100.0
        } else {
            0.0
        }
    }
}

/// # Summary
/// 单根历史 K 线。
///
/// # Invariants
/// - 序列按时间升序排列，每个采样周期一根。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    // K 线时间（交易所本地时间，日线为当日零点）
    pub time: NaiveDateTime,
    // 开盘价
    pub open: f64,
    // 最高价
    pub high: f64,
    // 最低价
    pub low: f64,
    // 收盘价
    pub close: f64,
    // 成交量
    pub volume: f64,
}

/// # Summary
/// 资金流向的具体数值，金额单位为万元。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowFigures {
    // 主力净流入
    pub main_inflow: f64,
    // 超大单净流入
    pub super_inflow: f64,
    // 大单净流入
    pub big_inflow: f64,
    // 中单净流入
    pub mid_inflow: f64,
    // 小单净流入
    pub small_inflow: f64,
    // 主力净流入占比（百分比），数据源未给出时为 None
    pub main_inflow_rate: Option<f64>,
}

/// # Summary
/// 资金流向查询结果。
///
/// # Invariants
/// - `Unavailable`: 网络失败，无法判断资金流向，调用方不应把它当作 0。
/// - `ZeroFlow`: 数据源响应了但没有可用数据点，按无资金流动处理。
/// - `Value`: 正常解析出的数值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CapitalFlow {
    Unavailable,
    ZeroFlow,
    Value(FlowFigures),
}

impl CapitalFlow {
    /// # Summary
    /// 主力净流入（万元）。
    ///
    /// # Returns
    /// `Unavailable` 返回 None；`ZeroFlow` 返回 0；`Value` 返回实际数值。
    pub fn main_inflow(&self) -> Option<f64> {
        match self {
            CapitalFlow::Unavailable => None,
            CapitalFlow::ZeroFlow => Some(0.0),
            CapitalFlow::Value(figures) => Some(figures.main_inflow),
        }
    }

    /// 主力净流入占比，仅 `Value` 且数据源给出占比时有值
    pub fn main_inflow_rate(&self) -> Option<f64> {
        match self {
            CapitalFlow::Value(figures) => figures.main_inflow_rate,
            _ => None,
        }
    }
}

/// # Summary
/// 扩展行情记录：实时行情 + 技术指标 + 资金流向。
///
/// # Invariants
/// - 以 `quote.code` 为键，每个标的一条。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedRecord {
    pub quote: Quote,
    pub indicators: IndicatorSet,
    pub capital_flow: CapitalFlow,
}

impl ExtendedRecord {
    pub fn code(&self) -> &InstrumentCode {
        &self.quote.code
    }
}
