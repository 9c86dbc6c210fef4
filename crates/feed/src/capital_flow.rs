use crate::http;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use stockscope_core::common::{InstrumentCode, Venue};
use stockscope_core::config::FeedConfig;
use stockscope_core::market::entity::{CapitalFlow, FlowFigures};
use stockscope_core::market::error::MarketError;
use stockscope_core::market::port::CapitalFlowSource;
use tracing::{debug, warn};

const REFERER: &str = "http://quote.eastmoney.com/";

// 金额字段单位换算：元 -> 万元
const TEN_THOUSAND: f64 = 10_000.0;

/// # Summary
/// 东方财富资金流向客户端。
///
/// # Invariants
/// - 网络失败返回 `Unavailable`，响应结构缺失或字段异常返回 `ZeroFlow`。
#[derive(Clone)]
pub struct CapitalFlowClient {
    client: Client,
    base_url: String,
}

#[derive(Deserialize, Debug)]
struct FlowResponse {
    data: Option<FlowData>,
}

#[derive(Deserialize, Debug)]
struct FlowData {
    klines: Option<Vec<String>>,
}

impl CapitalFlowClient {
    /// # Summary
    /// 创建资金流向客户端。
    ///
    /// # Arguments
    /// * `config`: 数据源配置，使用其中的 `capital_flow_base_url` 与超时设置。
    ///
    /// # Returns
    /// 成功返回客户端。
    pub fn new(config: &FeedConfig) -> Result<Self, MarketError> {
        Ok(Self {
            client: http::build_client(config, REFERER)?,
            base_url: config.capital_flow_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn try_fetch(&self, code: &InstrumentCode) -> Result<String, MarketError> {
        let url = format!("{}/api/qt/stock/fflow/kline/get", self.base_url);
        let secid = security_id(code);
        let request = self.client.get(&url).query(&[
            ("secid", secid.as_str()),
            ("fields1", "f1,f2,f3,f7"),
            ("fields2", "f51,f52,f53,f54,f55,f56,f57"),
            ("klt", "101"),
            ("lmt", "1"),
        ]);
        let body = http::fetch_bytes(request).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait]
impl CapitalFlowSource for CapitalFlowClient {
    /// # Summary
    /// 获取最新一个交易日的资金流向。
    ///
    /// # Logic
    /// 1. 网络层失败（含超时、非 2xx）返回 `Unavailable`。
    /// 2. 响应体交给 `parse_capital_flow` 解析。
    ///
    /// # Arguments
    /// * `code`: 证券代码。
    ///
    /// # Returns
    /// 三态资金流向。
    async fn get_capital_flow(&self, code: &InstrumentCode) -> CapitalFlow {
        match self.try_fetch(code).await {
            Ok(text) => parse_capital_flow(&text),
            Err(e) => {
                warn!("Capital flow fetch failed for {}: {}", code, e);
                CapitalFlow::Unavailable
            }
        }
    }
}

/// 东方财富证券标识：上交所 `1.<code>`，其余 `0.<code>`
pub fn security_id(code: &InstrumentCode) -> String {
    match code.venue() {
        Venue::Shanghai => format!("1.{}", code),
        Venue::Shenzhen | Venue::Beijing => format!("0.{}", code),
    }
}

/// # Summary
/// 解析资金流向响应。
///
/// # Logic
/// 1. 响应体不是 JSON，视为无法判断，返回 `Unavailable`。
/// 2. 缺少 `data.klines` 或为空，返回 `ZeroFlow`。
/// 3. 取最后一条 kline 交给 `parse_kline`，字段异常时返回 `ZeroFlow`。
///
/// # Arguments
/// * `text`: 响应文本。
///
/// # Returns
/// 三态资金流向。
pub fn parse_capital_flow(text: &str) -> CapitalFlow {
    let resp: FlowResponse = match serde_json::from_str(text) {
        Ok(resp) => resp,
        Err(e) => {
            warn!("Capital flow response is not JSON: {}", e);
            return CapitalFlow::Unavailable;
        }
    };

    let latest = resp
        .data
        .and_then(|d| d.klines)
        .and_then(|mut k| k.pop());

    match latest.as_deref().and_then(parse_kline) {
        Some(figures) => CapitalFlow::Value(figures),
        None => {
            debug!("Capital flow payload has no usable kline");
            CapitalFlow::ZeroFlow
        }
    }
}

/// # Summary
/// 解析单条资金流向 kline：`日期,主力,超大单,大单,中单,小单,主力占比`。
///
/// # Logic
/// 1. 位置 1..=5 为金额（元），除以 10000 转为万元。
/// 2. 位置 6 为主力净流入占比，缺失或为 `undefined` 时为 None。
///
/// # Arguments
/// * `line`: 逗号分隔的 kline 文本。
///
/// # Returns
/// 金额字段完整时返回 Some(FlowFigures)。
pub fn parse_kline(line: &str) -> Option<FlowFigures> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let money = |idx: usize| {
        fields
            .get(idx)
            .and_then(|f| f.parse::<f64>().ok())
            .map(|v| v / TEN_THOUSAND)
    };

    Some(FlowFigures {
        main_inflow: money(1)?,
        super_inflow: money(2)?,
        big_inflow: money(3)?,
        mid_inflow: money(4)?,
        small_inflow: money(5)?,
        main_inflow_rate: fields
            .get(6)
            .filter(|f| **f != "undefined")
            .and_then(|f| f.parse::<f64>().ok()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_id_by_venue() {
        assert_eq!(security_id(&InstrumentCode::new("600519")), "1.600519");
        assert_eq!(security_id(&InstrumentCode::new("000001")), "0.000001");
        assert_eq!(security_id(&InstrumentCode::new("830799")), "0.830799");
    }

    #[test]
    fn test_parse_latest_kline() {
        let text = r#"{"rc":0,"data":{"code":"600519","market":1,"klines":["2024-01-02,1,2,3,4,5,6","2024-01-03,-123456789.0,-23456789.0,-100000000.0,50000000.0,73456789.0,-3.21"]}}"#;
        match parse_capital_flow(text) {
            CapitalFlow::Value(f) => {
                assert!((f.main_inflow + 12345.6789).abs() < 1e-6);
                assert!((f.super_inflow + 2345.6789).abs() < 1e-6);
                assert!((f.big_inflow + 10000.0).abs() < 1e-6);
                assert!((f.mid_inflow - 5000.0).abs() < 1e-6);
                assert!((f.small_inflow - 7345.6789).abs() < 1e-6);
                assert_eq!(f.main_inflow_rate, Some(-3.21));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_rate_is_none() {
        let f = parse_kline("2024-01-03,10000,0,0,0,0,undefined").unwrap();
        assert_eq!(f.main_inflow, 1.0);
        assert_eq!(f.main_inflow_rate, None);
        assert_eq!(parse_kline("2024-01-03,10000,0,0,0,0").unwrap().main_inflow_rate, None);
    }

    #[test]
    fn test_missing_data_is_zero_flow() {
        assert_eq!(parse_capital_flow(r#"{"rc":0,"data":null}"#), CapitalFlow::ZeroFlow);
        assert_eq!(
            parse_capital_flow(r#"{"data":{"klines":[]}}"#),
            CapitalFlow::ZeroFlow
        );
        assert_eq!(
            parse_capital_flow(r#"{"data":{"klines":["2024-01-03,abc"]}}"#),
            CapitalFlow::ZeroFlow
        );
    }

    #[test]
    fn test_non_json_is_unavailable() {
        assert_eq!(parse_capital_flow("<html>busy</html>"), CapitalFlow::Unavailable);
    }
}
