use stockscope_core::backtest::entity::{
    BacktestOutcome, BacktestReport, OperationClass, OutcomeResult, PredictionRecord,
};
use stockscope_core::common::InstrumentCode;
use stockscope_core::market::entity::Quote;
use stockscope_core::market::port::QuoteSource;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// # Summary
/// 预测回测器。
///
/// # Invariants
/// - 每次运行只发起一次批量行情请求。
/// - 没有对应行情或预测价无效的记录被跳过，不计入报告。
/// - 结果按代码首次出现的顺序分组，组内保持预测的原始顺序。
pub struct BacktestTracker {
    quotes: Arc<dyn QuoteSource>,
}

impl BacktestTracker {
    pub fn new(quotes: Arc<dyn QuoteSource>) -> Self {
        Self { quotes }
    }

    /// # Summary
    /// 以最新行情为基准为一批预测打分。
    ///
    /// # Logic
    /// 1. 按首次出现顺序收集去重后的代码，并按代码分组预测。
    /// 2. 一次批量获取全部代码的最新行情。
    /// 3. 逐组逐条调用 [`score`]，缺少行情的代码整组跳过。
    ///
    /// # Arguments
    /// * `predictions`: 历史预测记录。
    ///
    /// # Returns
    /// 回测报告，预测为空时不发起任何请求。
    pub async fn run(&self, predictions: &[PredictionRecord]) -> BacktestReport {
        let mut order: Vec<InstrumentCode> = Vec::new();
        let mut grouped: HashMap<&InstrumentCode, Vec<&PredictionRecord>> = HashMap::new();
        for prediction in predictions {
            let group = grouped.entry(&prediction.code).or_default();
            if group.is_empty() {
                order.push(prediction.code.clone());
            }
            group.push(prediction);
        }

        if order.is_empty() {
            info!("Backtest: no predictions to check");
            return BacktestReport::default();
        }

        info!("Backtest: fetching latest prices for {} codes", order.len());
        let quotes: HashMap<InstrumentCode, Quote> = self
            .quotes
            .get_quotes(&order)
            .await
            .into_iter()
            .map(|q| (q.code.clone(), q))
            .collect();

        let mut outcomes = Vec::with_capacity(predictions.len());
        for code in &order {
            let Some(quote) = quotes.get(code) else {
                debug!("Backtest: no quote for {}, skipped", code);
                continue;
            };
            let Some(group) = grouped.get(code) else {
                continue;
            };
            outcomes.extend(group.iter().filter_map(|p| score(p, quote.current)));
        }

        BacktestReport { outcomes }
    }
}

/// # Summary
/// 以当前价为一条预测打分。
///
/// # Logic
/// 1. `diff = current - predicted`，收益率 = `diff / predicted * 100`。
/// 2. 买入类上涨或卖出类下跌为胜；买入类下跌或卖出类上涨为负；其余为平。
///
/// # Arguments
/// * `prediction`: 预测记录。
/// * `current_price`: 最新价。
///
/// # Returns
/// 预测价非正或非有限时无法计算收益率，返回 None。
pub fn score(prediction: &PredictionRecord, current_price: f64) -> Option<BacktestOutcome> {
    let predicted = prediction.predicted_price;
    if !predicted.is_finite() || predicted <= 0.0 {
        debug!(
            "Backtest: invalid predicted price {} for {}, skipped",
            predicted, prediction.code
        );
        return None;
    }

    let diff = current_price - predicted;
    let result = match OperationClass::classify(&prediction.operation) {
        OperationClass::Buy if diff > 0.0 => OutcomeResult::Win,
        OperationClass::Buy if diff < 0.0 => OutcomeResult::Loss,
        OperationClass::Sell if diff < 0.0 => OutcomeResult::Win,
        OperationClass::Sell if diff > 0.0 => OutcomeResult::Loss,
        _ => OutcomeResult::Neutral,
    };

    Some(BacktestOutcome {
        code: prediction.code.clone(),
        name: prediction.name.clone(),
        prediction_date: prediction.predicted_date.clone(),
        operation: prediction.operation.clone(),
        predicted_price: predicted,
        current_price,
        profit_rate_percent: diff / predicted * 100.0,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(operation: &str, price: f64) -> PredictionRecord {
        PredictionRecord {
            code: InstrumentCode::new("600519"),
            name: "贵州茅台".to_string(),
            predicted_date: Some("2024-03-01".to_string()),
            predicted_price: price,
            target_price: None,
            operation: operation.to_string(),
            probability: None,
        }
    }

    #[test]
    fn test_buy_rise_is_win() {
        let outcome = score(&prediction("买入", 100.0), 110.0).unwrap();
        assert_eq!(outcome.result, OutcomeResult::Win);
        assert!((outcome.profit_rate_percent - 10.0).abs() < 1e-9);
        assert!(outcome.to_string().contains("10.00%"));
    }

    #[test]
    fn test_buy_fall_is_loss() {
        let outcome = score(&prediction("增持", 100.0), 95.0).unwrap();
        assert_eq!(outcome.result, OutcomeResult::Loss);
        assert!((outcome.profit_rate_percent + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_sell_fall_is_win() {
        let outcome = score(&prediction("卖出", 100.0), 90.0).unwrap();
        assert_eq!(outcome.result, OutcomeResult::Win);
        assert!((outcome.profit_rate_percent + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_sell_rise_is_loss() {
        let outcome = score(&prediction("减持", 100.0), 101.0).unwrap();
        assert_eq!(outcome.result, OutcomeResult::Loss);
    }

    #[test]
    fn test_unchanged_price_is_neutral() {
        let outcome = score(&prediction("买入", 100.0), 100.0).unwrap();
        assert_eq!(outcome.result, OutcomeResult::Neutral);
        assert_eq!(outcome.profit_rate_percent, 0.0);
    }

    #[test]
    fn test_hold_is_always_neutral() {
        assert_eq!(
            score(&prediction("持有", 100.0), 130.0).unwrap().result,
            OutcomeResult::Neutral
        );
        assert_eq!(
            score(&prediction("观望", 100.0), 70.0).unwrap().result,
            OutcomeResult::Neutral
        );
    }

    #[test]
    fn test_invalid_predicted_price_is_skipped() {
        assert!(score(&prediction("买入", 0.0), 10.0).is_none());
        assert!(score(&prediction("买入", -1.0), 10.0).is_none());
        assert!(score(&prediction("买入", f64::NAN), 10.0).is_none());
    }
}
