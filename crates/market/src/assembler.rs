use futures::StreamExt;
use stockscope_core::common::{InstrumentCode, Sampling};
use stockscope_core::config::{HistoryConfig, PacingConfig};
use stockscope_core::indicator::entity::IndicatorSet;
use stockscope_core::market::entity::{ExtendedRecord, Quote};
use stockscope_core::market::port::{CapitalFlowSource, HistorySource, QuoteSource, Throttle};
use stockscope_indicator::{SignalLine, compute_indicator_set};
use std::sync::Arc;
use tracing::{debug, info};

/// # Summary
/// 扩展数据组装参数。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssemblerOptions {
    // 每个标的拉取的 K 线数量
    pub bar_count: usize,
    pub sampling: Sampling,
    // K 线少于该值时不计算指标
    pub min_bars: usize,
    // 同时处理的标的数
    pub concurrency: usize,
    pub signal_line: SignalLine,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            bar_count: 60,
            sampling: Sampling::Day1,
            min_bars: 20,
            concurrency: 1,
            signal_line: SignalLine::Simplified,
        }
    }
}

impl AssemblerOptions {
    pub fn from_config(history: &HistoryConfig, pacing: &PacingConfig) -> Self {
        Self {
            bar_count: history.bar_count,
            sampling: history.sampling,
            min_bars: history.min_bars,
            concurrency: pacing.concurrency,
            signal_line: history
                .macd_signal_period
                .map_or(SignalLine::Simplified, SignalLine::Ema),
        }
    }
}

/// # Summary
/// 扩展数据组装器：行情 + 历史 K 线指标 + 资金流向。
///
/// # Invariants
/// - 行情只批量请求一次，不经过限速器。
/// - 每次历史、资金流请求前都从共享限速器取令牌。
/// - 单个标的的失败只影响该标的的记录，不中断整体流程。
/// - 输出顺序与行情返回顺序一致。
pub struct ExtendedDataAssembler {
    quotes: Arc<dyn QuoteSource>,
    history: Arc<dyn HistorySource>,
    capital_flow: Arc<dyn CapitalFlowSource>,
    throttle: Arc<dyn Throttle>,
    options: AssemblerOptions,
}

impl ExtendedDataAssembler {
    pub fn new(
        quotes: Arc<dyn QuoteSource>,
        history: Arc<dyn HistorySource>,
        capital_flow: Arc<dyn CapitalFlowSource>,
        throttle: Arc<dyn Throttle>,
        options: AssemblerOptions,
    ) -> Self {
        Self {
            quotes,
            history,
            capital_flow,
            throttle,
            options,
        }
    }

    /// # Summary
    /// 为一组标的组装扩展数据。
    ///
    /// # Logic
    /// 1. 批量获取行情，未返回行情的标的不产生记录。
    /// 2. 以 `concurrency` 为宽度的有界并发流依次处理每个行情。
    /// 3. 按行情顺序收集结果。
    ///
    /// # Arguments
    /// * `codes`: 证券代码列表。
    ///
    /// # Returns
    /// 每个返回行情对应一条扩展记录。
    pub async fn assemble(&self, codes: &[InstrumentCode]) -> Vec<ExtendedRecord> {
        let quotes = self.quotes.get_quotes(codes).await;
        if quotes.is_empty() {
            info!("Assembler: no quotes returned for {} codes", codes.len());
            return Vec::new();
        }

        let total = quotes.len();
        let width = self.options.concurrency.max(1);
        info!(
            "Assembler: enriching {} instruments (concurrency {})",
            total, width
        );

        futures::stream::iter(quotes.into_iter().enumerate())
            .map(|(index, quote)| self.enrich(index, total, quote))
            .buffered(width)
            .collect()
            .await
    }

    /// # Summary
    /// 为单个行情补充指标与资金流向。
    ///
    /// # Logic
    /// 1. 取令牌后拉取历史 K 线。
    /// 2. K 线数不少于 `min_bars` 时计算指标，否则保留空指标集合。
    /// 3. 取令牌后拉取资金流向。
    async fn enrich(&self, index: usize, total: usize, quote: Quote) -> ExtendedRecord {
        let code = quote.code.clone();
        info!(
            "Assembler: [{}/{}] {} {}",
            index + 1,
            total,
            code,
            quote.name
        );

        self.throttle.acquire().await;
        let bars = self
            .history
            .get_history(&code, self.options.bar_count, self.options.sampling)
            .await;

        let indicators = if bars.len() >= self.options.min_bars {
            compute_indicator_set(&bars, quote.current, self.options.signal_line)
        } else {
            debug!(
                "Assembler: {} has {} bars, below {}; indicators skipped",
                code,
                bars.len(),
                self.options.min_bars
            );
            IndicatorSet::default()
        };

        self.throttle.acquire().await;
        let capital_flow = self.capital_flow.get_capital_flow(&code).await;

        ExtendedRecord {
            quote,
            indicators,
            capital_flow,
        }
    }
}
