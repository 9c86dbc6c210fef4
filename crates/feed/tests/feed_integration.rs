use encoding_rs::GBK;
use mockito::Matcher;
use stockscope_core::common::{InstrumentCode, Sampling};
use stockscope_core::config::FeedConfig;
use stockscope_core::market::entity::CapitalFlow;
use stockscope_core::market::port::{CapitalFlowSource, HistorySource, QuoteSource};
use stockscope_feed::capital_flow::CapitalFlowClient;
use stockscope_feed::history::HistoryClient;
use stockscope_feed::quote::QuoteClient;

/// 所有接口指向同一个 mock 服务器
fn config_for(url: &str) -> FeedConfig {
    FeedConfig {
        quote_base_url: url.to_string(),
        history_base_url: url.to_string(),
        capital_flow_base_url: url.to_string(),
        timeout_secs: 2,
        ..FeedConfig::default()
    }
}

fn quote_line(prefixed: &str, name: &str, current: &str) -> String {
    let mut fields = vec![name, "10.00", "10.00", current, "11.00", "9.50"];
    fields.resize(30, "0");
    fields.push("2024-01-02");
    fields.push("15:00:00");
    fields.push("00");
    format!("var hq_str_{}=\"{}\";", prefixed, fields.join(","))
}

/// # Summary
/// 批量行情：GBK 报文被正确解码，合格行全部解析。
#[tokio::test]
async fn test_quote_client_decodes_gbk_batch() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let text = format!(
        "{}\n{}\n",
        quote_line("sh600519", "贵州茅台", "11.00"),
        quote_line("sz000001", "平安银行", "9.00")
    );
    let (body, _, _) = GBK.encode(&text);

    let mock = server
        .mock("GET", Matcher::Regex(r"^/list=sh600519,sz000001$".to_string()))
        .match_header("referer", "https://finance.sina.com.cn/")
        .with_status(200)
        .with_body(body.into_owned())
        .create_async()
        .await;

    let client = QuoteClient::new(&config_for(&server.url()))?;
    let codes = vec![InstrumentCode::new("600519"), InstrumentCode::new("000001")];
    let quotes = client.get_quotes(&codes).await;

    mock.assert_async().await;
    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[0].name, "贵州茅台");
    assert!((quotes[0].change_percent - 10.0).abs() < 1e-9);
    assert_eq!(quotes[1].code.as_str(), "000001");
    assert!((quotes[1].change_percent + 10.0).abs() < 1e-9);
    Ok(())
}

/// # Summary
/// 传输失败与非 2xx 状态都降级为空列表。
#[tokio::test]
async fn test_quote_client_failure_yields_empty() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let codes = vec![InstrumentCode::new("600519")];
    let client = QuoteClient::new(&config_for(&server.url()))?;
    assert!(client.get_quotes(&codes).await.is_empty());

    let unreachable = QuoteClient::new(&config_for("http://127.0.0.1:1"))?;
    assert!(unreachable.get_quotes(&codes).await.is_empty());

    assert!(client.get_quotes(&[]).await.is_empty());
    Ok(())
}

/// # Summary
/// 历史 K 线：请求参数正确，结果截断到请求数量并保留最新的部分。
#[tokio::test]
async fn test_history_client_truncates_to_requested_count() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let body = r#"var _sh600519_2_240_data=([{"day":"2024-01-02","open":"1","high":"2","low":"0.5","close":"1.5","volume":"100"},{"day":"2024-01-03","open":"1.5","high":"2","low":"1","close":"1.8","volume":"120"},{"day":"2024-01-04","open":"1.8","high":"2.2","low":"1.7","close":"2.1","volume":"90"}]);"#;

    let mock = server
        .mock("GET", Matcher::Any)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("symbol".into(), "sh600519".into()),
            Matcher::UrlEncoded("scale".into(), "240".into()),
            Matcher::UrlEncoded("datalen".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let client = HistoryClient::new(&config_for(&server.url()))?;
    let bars = client
        .get_history(&InstrumentCode::new("600519"), 2, Sampling::Day1)
        .await;

    mock.assert_async().await;
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].close, 1.8);
    assert_eq!(bars[1].close, 2.1);
    Ok(())
}

/// # Summary
/// 历史 K 线：响应中没有数组时返回空列表而不是报错。
#[tokio::test]
async fn test_history_client_garbage_yields_empty() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", Matcher::Any)
        .with_status(200)
        .with_body("var _sz000001_60_240_data=(null);")
        .create_async()
        .await;

    let client = HistoryClient::new(&config_for(&server.url()))?;
    let bars = client
        .get_history(&InstrumentCode::new("000001"), 60, Sampling::Hour1)
        .await;
    assert!(bars.is_empty());
    Ok(())
}

/// # Summary
/// 资金流向：三种结果形态分别对应正常、空数据与网络失败。
#[tokio::test]
async fn test_capital_flow_client_states() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let value_mock = server
        .mock("GET", "/api/qt/stock/fflow/kline/get")
        .match_query(Matcher::UrlEncoded("secid".into(), "1.600519".into()))
        .with_status(200)
        .with_body(r#"{"data":{"klines":["2024-01-03,20000,10000,10000,-5000,-15000,2.5"]}}"#)
        .create_async()
        .await;
    let empty_mock = server
        .mock("GET", "/api/qt/stock/fflow/kline/get")
        .match_query(Matcher::UrlEncoded("secid".into(), "0.000001".into()))
        .with_status(200)
        .with_body(r#"{"data":null}"#)
        .create_async()
        .await;

    let client = CapitalFlowClient::new(&config_for(&server.url()))?;

    match client.get_capital_flow(&InstrumentCode::new("600519")).await {
        CapitalFlow::Value(f) => {
            assert_eq!(f.main_inflow, 2.0);
            assert_eq!(f.small_inflow, -1.5);
            assert_eq!(f.main_inflow_rate, Some(2.5));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(
        client.get_capital_flow(&InstrumentCode::new("000001")).await,
        CapitalFlow::ZeroFlow
    );
    value_mock.assert_async().await;
    empty_mock.assert_async().await;

    let unreachable = CapitalFlowClient::new(&config_for("http://127.0.0.1:1"))?;
    assert_eq!(
        unreachable
            .get_capital_flow(&InstrumentCode::new("600519"))
            .await,
        CapitalFlow::Unavailable
    );
    Ok(())
}
