use crate::http;
use async_trait::async_trait;
use encoding_rs::GBK;
use reqwest::Client;
use std::borrow::Cow;
use stockscope_core::common::InstrumentCode;
use stockscope_core::config::FeedConfig;
use stockscope_core::market::entity::Quote;
use stockscope_core::market::error::MarketError;
use stockscope_core::market::port::QuoteSource;
use tracing::{debug, warn};

const REFERER: &str = "https://finance.sina.com.cn/";

// 一行合格报文的最少字段数（需 > 30）
const MIN_FIELDS: usize = 31;

/// # Summary
/// 新浪实时行情客户端。
///
/// # Invariants
/// - 一次调用只发一个批量请求，不做限速。
/// - 报文使用 GBK 编码，解码失败时回落到 UTF-8。
#[derive(Clone)]
pub struct QuoteClient {
    client: Client,
    base_url: String,
}

impl QuoteClient {
    /// # Summary
    /// 创建实时行情客户端。
    ///
    /// # Arguments
    /// * `config`: 数据源配置，使用其中的 `quote_base_url` 与超时设置。
    ///
    /// # Returns
    /// 成功返回客户端，HTTP 客户端构造失败返回 MarketError。
    pub fn new(config: &FeedConfig) -> Result<Self, MarketError> {
        Ok(Self {
            client: http::build_client(config, REFERER)?,
            base_url: config.quote_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request_url(&self, codes: &[InstrumentCode]) -> String {
        let list = codes
            .iter()
            .map(InstrumentCode::prefixed)
            .collect::<Vec<_>>()
            .join(",");
        format!("{}/list={}", self.base_url, list)
    }

    async fn try_fetch(&self, codes: &[InstrumentCode]) -> Result<Vec<Quote>, MarketError> {
        let body = http::fetch_bytes(self.client.get(self.request_url(codes))).await?;
        Ok(parse_quotes(&decode_body(&body)))
    }
}

#[async_trait]
impl QuoteSource for QuoteClient {
    /// # Summary
    /// 批量获取实时行情。
    ///
    /// # Logic
    /// 1. 空输入直接返回，不发请求。
    /// 2. 请求失败时记录警告并返回空列表。
    ///
    /// # Arguments
    /// * `codes`: 证券代码列表。
    ///
    /// # Returns
    /// 成功解析的行情列表。
    async fn get_quotes(&self, codes: &[InstrumentCode]) -> Vec<Quote> {
        if codes.is_empty() {
            return Vec::new();
        }

        match self.try_fetch(codes).await {
            Ok(quotes) => {
                debug!("Parsed {} quotes for {} codes", quotes.len(), codes.len());
                quotes
            }
            Err(e) => {
                warn!("Quote fetch failed for {} codes: {}", codes.len(), e);
                Vec::new()
            }
        }
    }
}

/// # Summary
/// 解码行情响应体。
///
/// # Logic
/// 1. 优先按 GBK 严格解码。
/// 2. 出现非法字节时回落到 UTF-8（有损），此时名称可能乱码，数值字段不受影响。
///
/// # Arguments
/// * `body`: 原始响应字节。
///
/// # Returns
/// 解码后的文本。
pub fn decode_body(body: &[u8]) -> Cow<'_, str> {
    GBK.decode_without_bom_handling_and_without_replacement(body)
        .unwrap_or_else(|| {
            debug!("GBK decode failed, falling back to UTF-8");
            String::from_utf8_lossy(body)
        })
}

/// # Summary
/// 逐行解析行情报文。
///
/// # Logic
/// 1. 按换行拆分。
/// 2. 每行交给 `parse_quote_line`，不合格的行跳过，不影响后续行。
///
/// # Arguments
/// * `text`: 已解码的响应文本。
///
/// # Returns
/// 成功解析的行情列表。
pub fn parse_quotes(text: &str) -> Vec<Quote> {
    text.lines().filter_map(parse_quote_line).collect()
}

/// # Summary
/// 解析单行行情报文：`var hq_str_sh600519="贵州茅台,1700.00,...";`
///
/// # Logic
/// 1. 定位 `var hq_str_` 并取出两位小写字母前缀 + 数字代码。
/// 2. 取出引号内非空的字段串，且引号后紧跟 `;`。
/// 3. 字段数必须大于 30。
/// 4. 字段 0 名称、1 开盘、2 昨收、3 最新、4 最高、5 最低、8 成交量、9 成交额、30 日期、31 时间。
///
/// # Arguments
/// * `line`: 单行文本。
///
/// # Returns
/// 合格行返回 Some(Quote)，否则 None。
pub fn parse_quote_line(line: &str) -> Option<Quote> {
    let start = line.find("var hq_str_")?;
    let rest = &line[start + "var hq_str_".len()..];
    let (symbol, rest) = rest.split_once("=\"")?;
    let end = rest.find('"')?;
    let body = &rest[..end];
    if body.is_empty() || !rest[end..].starts_with("\";") {
        return None;
    }

    let prefix = symbol.get(..2)?;
    let digits = &symbol[2..];
    if !prefix.chars().all(|c| c.is_ascii_lowercase())
        || digits.is_empty()
        || !digits.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let num = |idx: usize| fields.get(idx).and_then(|f| f.trim().parse::<f64>().ok());
    let current = num(3)?;
    let previous_close = num(2)?;

    Some(Quote {
        code: InstrumentCode::new(digits),
        name: fields[0].to_string(),
        current,
        previous_close,
        open: num(1)?,
        high: num(4)?,
        low: num(5)?,
        change_percent: Quote::change_percent_of(current, previous_close),
        volume: num(8).unwrap_or(0.0),
        amount: num(9).unwrap_or(0.0),
        date: fields[30].to_string(),
        time: fields.get(31).map(|t| t.to_string()).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(code: &str, fields: usize) -> String {
        let mut parts = vec![
            "贵州茅台".to_string(),
            "1700.00".to_string(),
            "1690.00".to_string(),
            "1720.50".to_string(),
            "1730.00".to_string(),
            "1695.00".to_string(),
            "1720.40".to_string(),
            "1720.50".to_string(),
            "2500000".to_string(),
            "4300000000.00".to_string(),
        ];
        while parts.len() < 30 {
            parts.push("0".to_string());
        }
        parts.push("2024-01-02".to_string());
        parts.push("15:00:03".to_string());
        parts.push("00".to_string());
        parts.truncate(fields);
        format!("var hq_str_{}=\"{}\";", code, parts.join(","))
    }

    #[test]
    fn test_parse_full_line() {
        let quote = parse_quote_line(&line("sh600519", 33)).unwrap();
        assert_eq!(quote.code.as_str(), "600519");
        assert_eq!(quote.name, "贵州茅台");
        assert_eq!(quote.open, 1700.0);
        assert_eq!(quote.previous_close, 1690.0);
        assert_eq!(quote.current, 1720.5);
        assert_eq!(quote.high, 1730.0);
        assert_eq!(quote.low, 1695.0);
        assert_eq!(quote.volume, 2_500_000.0);
        assert_eq!(quote.date, "2024-01-02");
        assert_eq!(quote.time, "15:00:03");
        assert!((quote.change_percent - 30.5 / 1690.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_line_is_skipped_without_aborting() {
        let text = [
            line("sh600519", 30),
            "var hq_str_sz000001=\"\";".to_string(),
            "garbage".to_string(),
            line("sz000001", 32),
        ]
        .join("\n");

        let quotes = parse_quotes(&text);
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].code.as_str(), "000001");
    }

    #[test]
    fn test_line_with_exactly_31_fields_is_accepted() {
        let quote = parse_quote_line(&line("bj830799", 31)).unwrap();
        assert_eq!(quote.code.as_str(), "830799");
        assert_eq!(quote.time, "");
    }

    #[test]
    fn test_rejects_malformed_symbol_and_terminator() {
        assert!(parse_quote_line(&line("SH600519", 33)).is_none());
        assert!(parse_quote_line(&line("sh60a519", 33)).is_none());
        let unterminated = line("sh600519", 33).trim_end_matches(';').to_string();
        assert!(parse_quote_line(&unterminated).is_none());
    }

    #[test]
    fn test_decode_gbk_then_utf8_fallback() {
        let (gbk, _, _) = GBK.encode("var hq_str_sh600519=\"贵州茅台\";");
        assert!(decode_body(&gbk).contains("贵州茅台"));

        // 0xFF 在 GBK 中非法，走 UTF-8 有损回落
        let invalid = [b'a', 0xFF, b'b'];
        let text = decode_body(&invalid);
        assert!(text.starts_with('a'));
        assert!(text.ends_with('b'));
    }
}
