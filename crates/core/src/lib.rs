//! # `stockscope-core` - 领域核心
//!
//! 定义行情采集、技术指标与预测回测共享的实体、端口 (Port) 与错误类型。
//! 本 crate 不包含任何 I/O 实现，具体数据源由 `stockscope-feed` 提供。

pub mod common;
pub mod config;

pub mod market {
    pub mod entity;
    pub mod error;
    pub mod port;
}

pub mod indicator {
    pub mod entity;
}

pub mod backtest {
    pub mod entity;
}

pub mod store {
    pub mod error;
    pub mod port;
}
