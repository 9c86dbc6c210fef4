use thiserror::Error;

/// # Summary
/// 存储层错误枚举，处理预测记录文件的读取与解析问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug)]
pub enum StoreError {
    /// 文件系统读写失败
    #[error("IO error: {0}")]
    Io(String),
    /// 记录内容无法解析
    #[error("Parse error: {0}")]
    Parse(String),
}
