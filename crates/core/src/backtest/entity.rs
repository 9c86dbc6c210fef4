use crate::common::{InstrumentCode, count_as_f64};
use serde::{Deserialize, Serialize};
use std::fmt;

/// # Summary
/// 历史预测记录，由外部报告存储提供，本系统只读。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    // 证券代码
    pub code: InstrumentCode,
    // 证券简称
    pub name: String,
    // 预测日期
    pub predicted_date: Option<String>,
    // 预测时的价格
    pub predicted_price: f64,
    // 目标价
    pub target_price: Option<f64>,
    // 操作建议，例如 "买入"、"持有"、"减持"
    pub operation: String,
    // 置信度描述
    pub probability: Option<String>,
}

/// # Summary
/// 操作建议的方向分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationClass {
    Buy,
    Sell,
    Hold,
}

impl OperationClass {
    /// # Summary
    /// 根据操作建议文本判断方向。
    ///
    /// # Logic
    /// 1. 含 "买" / "增持" 或英文 buy 的为买入类。
    /// 2. 含 "卖" / "减持" 或英文 sell 的为卖出类。
    /// 3. 其余（持有、观望等）为持有类。
    ///
    /// # Arguments
    /// * `label`: 操作建议文本。
    ///
    /// # Returns
    /// 方向分类。
    pub fn classify(label: &str) -> Self {
        let lower = label.to_lowercase();
        if label.contains('买') || label.contains("增持") || lower.contains("buy") {
            OperationClass::Buy
        } else if label.contains('卖') || label.contains("减持") || lower.contains("sell") {
            OperationClass::Sell
        } else {
            OperationClass::Hold
        }
    }
}

/// # Summary
/// 单条预测的回测结果标签。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeResult {
    Win,
    Loss,
    Neutral,
}

impl fmt::Display for OutcomeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeResult::Win => f.write_str("胜"),
            OutcomeResult::Loss => f.write_str("负"),
            OutcomeResult::Neutral => f.write_str("平"),
        }
    }
}

/// # Summary
/// 单条预测的回测结果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestOutcome {
    pub code: InstrumentCode,
    pub name: String,
    pub prediction_date: Option<String>,
    pub operation: String,
    pub predicted_price: f64,
    pub current_price: f64,
    // 收益率（百分比）
    pub profit_rate_percent: f64,
    pub result: OutcomeResult,
}

impl fmt::Display for BacktestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{:.2}%\t{}",
            self.code,
            self.name,
            self.prediction_date.as_deref().unwrap_or("-"),
            self.operation,
            self.predicted_price,
            self.current_price,
            self.profit_rate_percent,
            self.result
        )
    }
}

/// # Summary
/// 一次回测的汇总报告。
///
/// # Invariants
/// - 胜率分母只计入胜与负，平局不计入。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub outcomes: Vec<BacktestOutcome>,
}

impl BacktestReport {
    fn count(&self, result: OutcomeResult) -> usize {
        self.outcomes.iter().filter(|o| o.result == result).count()
    }

    pub fn wins(&self) -> usize {
        self.count(OutcomeResult::Win)
    }

    pub fn losses(&self) -> usize {
        self.count(OutcomeResult::Loss)
    }

    pub fn neutrals(&self) -> usize {
        self.count(OutcomeResult::Neutral)
    }

    /// # Summary
    /// 整体胜率（百分比）。
    ///
    /// # Returns
    /// `wins / (wins + losses) * 100`；没有任何胜负结果时返回 None。
    pub fn win_rate(&self) -> Option<f64> {
        let wins = self.wins();
        let decided = wins + self.losses();
        if decided == 0 {
            return None;
        }
        Some(count_as_f64(wins) / count_as_f64(decided) * 100.0)
    }
}
