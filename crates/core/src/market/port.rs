use crate::common::{InstrumentCode, Sampling};
use crate::market::entity::{Bar, CapitalFlow, Quote};
use async_trait::async_trait;

/// # Summary
/// 实时行情数据源接口。
///
/// # Invariants
/// - 不向调用方抛出错误：传输失败或响应异常时返回空列表并记录日志。
/// - 一次调用只发起一个批量请求。
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// # Summary
    /// 批量获取实时行情。
    ///
    /// # Logic
    /// 1. 为每个代码推导交易所前缀并拼接为单个请求。
    /// 2. 解码响应并逐行解析。
    /// 3. 不合格的行静默跳过。
    ///
    /// # Arguments
    /// * `codes`: 证券代码列表。
    ///
    /// # Returns
    /// 每个成功解析的行对应一条行情，不保证与输入顺序一致。
    async fn get_quotes(&self, codes: &[InstrumentCode]) -> Vec<Quote>;
}

/// # Summary
/// 历史 K 线数据源接口。
///
/// # Invariants
/// - 返回的序列按时间升序，长度不超过 `bar_count`。
/// - 任何失败都降级为空列表。
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// # Summary
    /// 获取单个标的最近若干根 K 线。
    ///
    /// # Arguments
    /// * `code`: 证券代码。
    /// * `bar_count`: 请求的 K 线数量上限。
    /// * `sampling`: 采样粒度。
    ///
    /// # Returns
    /// K 线列表，可能短于请求数量。
    async fn get_history(
        &self,
        code: &InstrumentCode,
        bar_count: usize,
        sampling: Sampling,
    ) -> Vec<Bar>;
}

/// # Summary
/// 资金流向数据源接口。
///
/// # Invariants
/// - 网络失败返回 `CapitalFlow::Unavailable`。
/// - 响应缺失或格式错误返回 `CapitalFlow::ZeroFlow`。
#[async_trait]
pub trait CapitalFlowSource: Send + Sync {
    /// # Summary
    /// 获取单个标的最新一个交易日的资金流向。
    ///
    /// # Arguments
    /// * `code`: 证券代码。
    ///
    /// # Returns
    /// 三态资金流向结果。
    async fn get_capital_flow(&self, code: &InstrumentCode) -> CapitalFlow;
}

/// # Summary
/// 外部请求限速器。
///
/// # Invariants
/// - 多个并发调用方共享同一个实例时，整体请求速率不超过配置值。
#[async_trait]
pub trait Throttle: Send + Sync {
    /// 等待直到允许发出下一个请求
    async fn acquire(&self);
}
