use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use std::sync::Once;
use std::time::Duration;
use stockscope_core::config::FeedConfig;
use stockscope_core::market::error::MarketError;
use tracing::debug;

static CRYPTO_PROVIDER: Once = Once::new();

/// # Summary
/// 构造带有超时与伪装 Header 的 HTTP 客户端。
///
/// # Logic
/// 1. 确保进程级 rustls 加密提供者已安装。
/// 2. 设置 Referer（数据源缺少该 Header 会拒绝请求）与 User-Agent。
/// 3. 配置单次请求超时。
///
/// # Arguments
/// * `config`: 数据源配置。
/// * `referer`: 数据源要求的来源页。
///
/// # Returns
/// 成功返回 reqwest 客户端。
pub(crate) fn build_client(config: &FeedConfig, referer: &'static str) -> Result<Client, MarketError> {
    CRYPTO_PROVIDER.call_once(|| {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            debug!("rustls crypto provider already installed");
        }
    });

    let mut headers = HeaderMap::new();
    headers.insert(REFERER, HeaderValue::from_static(referer));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent).map_err(|e| MarketError::Unknown(e.to_string()))?,
    );

    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(headers)
        .build()
        .map_err(|e| MarketError::Network(e.to_string()))
}

/// # Summary
/// 发送请求并读取完整响应体。
///
/// # Logic
/// 1. 网络错误、超时映射为 `MarketError::Network`。
/// 2. 非 2xx 状态映射为 `MarketError::Status`。
///
/// # Returns
/// 原始响应字节。
pub(crate) async fn fetch_bytes(request: RequestBuilder) -> Result<Vec<u8>, MarketError> {
    let resp = request
        .send()
        .await
        .map_err(|e| MarketError::Network(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(MarketError::Status(resp.status().as_u16()));
    }

    let body = resp
        .bytes()
        .await
        .map_err(|e| MarketError::Network(e.to_string()))?;
    Ok(body.to_vec())
}
