use thiserror::Error;

/// # Summary
/// 市场数据域错误枚举，处理网络、解析及数据缺失等问题。
///
/// # Invariants
/// - 仅在数据源客户端内部流转，端口方法对外统一降级为空结果或哨兵值。
#[derive(Error, Debug)]
pub enum MarketError {
    // 网络层错误（超时、DNS、连接被拒等）
    #[error("Network error: {0}")]
    Network(String),
    // 数据源返回非成功状态码
    #[error("HTTP status {0}")]
    Status(u16),
    // 响应格式不符合预期（正则、括号、字段数不匹配）
    #[error("Parse error: {0}")]
    Parse(String),
    // 响应中没有请求的数据
    #[error("Data not found")]
    NotFound,
    // 未知或未分类的错误
    #[error("Unknown error: {0}")]
    Unknown(String),
}
