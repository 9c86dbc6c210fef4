use crate::http;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use reqwest::Client;
use serde::Deserialize;
use stockscope_core::common::{InstrumentCode, Sampling};
use stockscope_core::config::FeedConfig;
use stockscope_core::market::entity::Bar;
use stockscope_core::market::error::MarketError;
use stockscope_core::market::port::HistorySource;
use tracing::{debug, warn};

const REFERER: &str = "https://finance.sina.com.cn/";

/// # Summary
/// 新浪历史 K 线客户端。
///
/// # Invariants
/// - 响应是 JSONP 脚本（`var _sh600519_60_240_data=([...]);`），只解析其中的数组部分。
/// - 返回的 K 线数量不超过请求数量。
#[derive(Clone)]
pub struct HistoryClient {
    client: Client,
    base_url: String,
}

/// # Summary
/// 数据源返回的单根 K 线，数值字段通常是字符串。
#[derive(Deserialize, Debug)]
struct RawBar {
    day: String,
    open: RawNumber,
    high: RawNumber,
    low: RawNumber,
    close: RawNumber,
    #[serde(default)]
    volume: Option<RawNumber>,
}

/// 字符串或数字形式的数值
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    fn value(&self) -> Option<f64> {
        match self {
            RawNumber::Number(n) => Some(*n),
            RawNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl HistoryClient {
    /// # Summary
    /// 创建历史 K 线客户端。
    ///
    /// # Arguments
    /// * `config`: 数据源配置，使用其中的 `history_base_url` 与超时设置。
    ///
    /// # Returns
    /// 成功返回客户端。
    pub fn new(config: &FeedConfig) -> Result<Self, MarketError> {
        Ok(Self {
            client: http::build_client(config, REFERER)?,
            base_url: config.history_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn try_fetch(
        &self,
        code: &InstrumentCode,
        bar_count: usize,
        sampling: Sampling,
    ) -> Result<Vec<Bar>, MarketError> {
        let symbol = code.prefixed();
        let scale = sampling.minutes().to_string();
        let datalen = bar_count.to_string();
        let url = format!(
            "{}/cn/api/jsonp_v2.php/var%20_{}_{}_{}_data=/CN_MarketDataService.getKLineData",
            self.base_url, symbol, datalen, scale
        );

        let request = self.client.get(&url).query(&[
            ("symbol", symbol.as_str()),
            ("scale", scale.as_str()),
            ("datalen", datalen.as_str()),
        ]);
        let body = http::fetch_bytes(request).await?;
        let text = String::from_utf8_lossy(&body);

        let mut bars = parse_bars(&text)?;
        if bars.len() > bar_count {
            bars.drain(..bars.len() - bar_count);
        }
        Ok(bars)
    }
}

#[async_trait]
impl HistorySource for HistoryClient {
    /// # Summary
    /// 获取单个标的最近若干根 K 线。
    ///
    /// # Logic
    /// 1. 请求 JSONP 接口并截取数组。
    /// 2. 网络失败、缺少括号或 JSON 解析失败时记录警告并返回空列表。
    ///
    /// # Arguments
    /// * `code`: 证券代码。
    /// * `bar_count`: 最多返回的 K 线数量。
    /// * `sampling`: 采样粒度。
    ///
    /// # Returns
    /// 按时间升序的 K 线列表。
    async fn get_history(
        &self,
        code: &InstrumentCode,
        bar_count: usize,
        sampling: Sampling,
    ) -> Vec<Bar> {
        if bar_count == 0 {
            return Vec::new();
        }

        match self.try_fetch(code, bar_count, sampling).await {
            Ok(bars) => bars,
            Err(e) => {
                warn!("History fetch failed for {} ({}): {}", code, sampling, e);
                Vec::new()
            }
        }
    }
}

/// # Summary
/// 从脚本包裹的文本中截取 JSON 数组。
///
/// # Logic
/// 取第一个 `[` 到最后一个 `]`（含）之间的子串。
///
/// # Arguments
/// * `text`: 原始响应文本。
///
/// # Returns
/// 找到成对括号时返回数组子串，否则 None。
pub fn extract_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// # Summary
/// 解析 JSONP 包裹的 K 线数组。
///
/// # Logic
/// 1. 截取数组，缺失时返回 `MarketError::NotFound`。
/// 2. 反序列化为 JSON 数组，失败时返回 `MarketError::Parse`。
/// 3. 逐条转换：字段缺失、为 null、日期或数值无法解析的条目丢弃，不影响其余条目。
///
/// # Arguments
/// * `text`: 原始响应文本。
///
/// # Returns
/// K 线列表（保持数据源顺序，即时间升序）。
pub fn parse_bars(text: &str) -> Result<Vec<Bar>, MarketError> {
    let array = extract_array(text).ok_or(MarketError::NotFound)?;
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(array).map_err(|e| MarketError::Parse(e.to_string()))?;

    let total = entries.len();
    let bars: Vec<Bar> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<RawBar>(entry).ok())
        .filter_map(|raw| convert_bar(&raw))
        .collect();
    if bars.len() < total {
        debug!("Dropped {} malformed bars", total - bars.len());
    }
    Ok(bars)
}

fn convert_bar(raw: &RawBar) -> Option<Bar> {
    Some(Bar {
        time: parse_day(&raw.day)?,
        open: raw.open.value()?,
        high: raw.high.value()?,
        low: raw.low.value()?,
        close: raw.close.value()?,
        volume: raw.volume.as_ref().and_then(RawNumber::value).unwrap_or(0.0),
    })
}

/// 日线为 `2024-01-02`，分钟线为 `2024-01-02 10:30:00`
fn parse_day(day: &str) -> Option<NaiveDateTime> {
    let day = day.trim();
    NaiveDateTime::parse_from_str(day, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"/*<script>location.href='//sina.com';</script>*/
var _sh600519_3_240_data=([{"day":"2024-01-02","open":"1700.000","high":"1720.000","low":"1690.000","close":"1710.000","volume":"2500000"},{"day":"2024-01-03","open":"1710.000","high":"1730.000","low":"1705.000","close":"1725.500","volume":"2100000"},{"day":"2024-01-04 10:30:00","open":1725.5,"high":1740,"low":1720,"close":1735,"volume":1800000}]);"#;

    #[test]
    fn test_parse_wrapped_array() {
        let bars = parse_bars(SAMPLE).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].close, 1710.0);
        assert_eq!(bars[1].close, 1725.5);
        assert_eq!(bars[2].open, 1725.5);
        assert_eq!(
            bars[2].time,
            NaiveDateTime::parse_from_str("2024-01-04 10:30:00", "%Y-%m-%d %H:%M:%S").unwrap()
        );
        assert!(bars[0].time < bars[1].time);
    }

    #[test]
    fn test_missing_bracket_is_not_found() {
        assert!(matches!(
            parse_bars("var _sh600519_data=(null);"),
            Err(MarketError::NotFound)
        ));
        assert!(extract_array("] oops [").is_none());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        assert!(matches!(
            parse_bars("var x=([{\"day\":]);"),
            Err(MarketError::Parse(_))
        ));
    }

    #[test]
    fn test_malformed_entries_are_dropped() {
        let text = r#"([{"day":"bad","open":"1","high":"1","low":"1","close":"1"},{"day":"2024-01-02","open":"x","high":"1","low":"1","close":"1"},{"day":"2024-01-03","open":"1","high":"2","low":"0.5","close":"1.5"}])"#;
        let bars = parse_bars(text).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 1.5);
        assert_eq!(bars[0].volume, 0.0);
    }

    #[test]
    fn test_null_or_missing_fields_drop_only_that_entry() {
        let text = r#"([{"day":"2024-01-02","open":"1","high":"2","low":"0.5","close":"1.2"},{"day":"2024-01-03","open":null,"high":"2","low":"0.5","close":"1.3"},{"day":"2024-01-04","high":"2","low":"0.5","close":"1.4"},{"day":"2024-01-05","open":"1","high":{"v":2},"low":"0.5","close":"1.5"},{"day":"2024-01-08","open":"1","high":"2","low":"0.5","close":"1.6"}])"#;
        let bars = parse_bars(text).unwrap();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![1.2, 1.6]);
    }

    #[test]
    fn test_null_volume_defaults_to_zero() {
        let text = r#"([{"day":"2024-01-02","open":"1","high":"2","low":"0.5","close":"1.2","volume":null}])"#;
        let bars = parse_bars(text).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].volume, 0.0);
    }
}
