//! # `stockscope-market` - 扩展数据编排
//!
//! 把行情、历史 K 线与资金流向三个数据源组合为逐标的的扩展记录，
//! 外部请求通过共享的令牌桶限速。

pub mod assembler;
pub mod limiter;

pub use assembler::{AssemblerOptions, ExtendedDataAssembler};
pub use limiter::TokenBucket;
