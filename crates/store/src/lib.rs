//! # `stockscope-store` - 分析报告读取
//!
//! 以只读方式把历史分析报告转换为待回测的预测记录。

pub mod prediction;

pub use prediction::JsonPredictionStore;
