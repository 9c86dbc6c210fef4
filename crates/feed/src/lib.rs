//! # `stockscope-feed` - 外部行情数据源
//!
//! 三个客户端分别实现 `stockscope-core` 中的数据源端口：
//! - [`quote::QuoteClient`]: 新浪实时行情（批量、GBK 编码的文本报文）
//! - [`history::HistoryClient`]: 新浪历史 K 线（JSONP 包裹的数组）
//! - [`capital_flow::CapitalFlowClient`]: 东方财富资金流向
//!
//! 所有报文解析函数都是公开的纯函数，便于离线测试。

pub mod capital_flow;
pub mod history;
mod http;
pub mod quote;
