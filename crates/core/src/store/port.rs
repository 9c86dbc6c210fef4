use crate::backtest::entity::PredictionRecord;
use crate::store::error::StoreError;
use async_trait::async_trait;

/// # Summary
/// 历史预测记录的只读来源。
///
/// # Invariants
/// - 只读：实现者不得修改或写入分析记录。
#[async_trait]
pub trait PredictionSource: Send + Sync {
    /// # Summary
    /// 加载待核对的历史预测。
    ///
    /// # Logic
    /// 1. 定位最近的若干份分析记录。
    /// 2. 逐份解析出个股预测，损坏的记录跳过。
    ///
    /// # Returns
    /// 成功返回预测列表（可能为空），整体不可读时返回 StoreError。
    async fn load_predictions(&self) -> Result<Vec<PredictionRecord>, StoreError>;
}
