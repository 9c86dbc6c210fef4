use async_trait::async_trait;
use serde::Deserialize;
use stockscope_core::backtest::entity::PredictionRecord;
use stockscope_core::common::InstrumentCode;
use stockscope_core::store::error::StoreError;
use stockscope_core::store::port::PredictionSource;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const FILE_PREFIX: &str = "analysis-";
const FILE_SUFFIX: &str = ".json";

/// PredictionSource 的 JSON 文件实现，只读。
///
/// # Summary
/// 读取分析报告目录下最近的若干份 `analysis-*.json`，提取其中的个股预测。
///
/// # Invariants
/// * 文件按文件名降序选取（文件名内嵌时间戳，降序即最新优先）。
/// * 损坏或无法读取的单个文件被跳过，不影响其余文件。
/// * 目录不存在视为没有预测。
pub struct JsonPredictionStore {
    dir: PathBuf,
    max_files: usize,
}

impl JsonPredictionStore {
    pub fn new(dir: impl Into<PathBuf>, max_files: usize) -> Self {
        Self {
            dir: dir.into(),
            max_files,
        }
    }

    /// 列出最近的分析文件。
    ///
    /// # Logic
    /// 1. 遍历目录，保留 `analysis-` 开头、`.json` 结尾的文件名。
    /// 2. 按文件名降序排序后截取前 `max_files` 个。
    ///
    /// # Returns
    /// * 目录不存在时返回空列表，其他读取失败返回 `StoreError::Io`。
    async fn recent_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Prediction store: {} not found, nothing to load", self.dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX) {
                names.push(name);
            }
        }

        names.sort_unstable_by(|a, b| b.cmp(a));
        names.truncate(self.max_files);
        Ok(names.into_iter().map(|n| self.dir.join(n)).collect())
    }
}

#[async_trait]
impl PredictionSource for JsonPredictionStore {
    async fn load_predictions(&self) -> Result<Vec<PredictionRecord>, StoreError> {
        let files = self.recent_files().await?;
        let mut predictions = Vec::new();

        for path in &files {
            match load_file(path).await {
                Ok(mut records) => {
                    debug!(
                        "Prediction store: {} predictions from {}",
                        records.len(),
                        path.display()
                    );
                    predictions.append(&mut records);
                }
                Err(e) => warn!("Prediction store: skipping {}: {}", path.display(), e),
            }
        }

        info!(
            "Prediction store: loaded {} predictions from {} files",
            predictions.len(),
            files.len()
        );
        Ok(predictions)
    }
}

async fn load_file(path: &Path) -> Result<Vec<PredictionRecord>, StoreError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StoreError::Io(e.to_string()))?;
    parse_analysis(&text)
}

#[derive(Deserialize)]
struct AnalysisFile {
    #[serde(default)]
    meta: Option<Meta>,
    #[serde(default)]
    analysis: Option<Analysis>,
}

#[derive(Deserialize)]
struct Meta {
    #[serde(default)]
    date: Option<String>,
}

#[derive(Deserialize)]
struct Analysis {
    #[serde(default, rename = "stockAnalysis")]
    stock_analysis: Vec<RawPrediction>,
}

#[derive(Deserialize)]
struct RawPrediction {
    #[serde(default)]
    stock_code: Option<Scalar>,
    #[serde(default)]
    stock_name: Option<String>,
    #[serde(default)]
    current_price: Option<Scalar>,
    #[serde(default)]
    target_price: Option<Scalar>,
    #[serde(default)]
    operation: Option<String>,
    #[serde(default)]
    probability: Option<Scalar>,
}

/// 报告里的数值字段可能是数字也可能是带单位的字符串
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    fn as_text(&self) -> String {
        match self {
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s.trim().to_string(),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => leading_number(s),
        }
    }
}

/// 解析字符串开头的数值部分，例如 "12.50元" -> 12.5
fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let end = text
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))))
        .map_or(text.len(), |(i, _)| i);
    text[..end].parse().ok()
}

/// 解析单份分析报告。
///
/// # Logic
/// 1. 反序列化为宽松结构，`meta.date` 作为所有预测的日期。
/// 2. 缺少股票代码的条目跳过。
/// 3. 预测价无法解析时记为 NaN，交由回测方判定跳过。
///
/// # Arguments
/// * `text` - 报告 JSON 文本。
///
/// # Returns
/// * 预测列表，JSON 不合法时返回 `StoreError::Parse`。
pub fn parse_analysis(text: &str) -> Result<Vec<PredictionRecord>, StoreError> {
    let file: AnalysisFile =
        serde_json::from_str(text).map_err(|e| StoreError::Parse(e.to_string()))?;
    let date = file.meta.and_then(|m| m.date);
    let entries = file.analysis.map(|a| a.stock_analysis).unwrap_or_default();

    Ok(entries
        .into_iter()
        .filter_map(|raw| {
            let code = raw.stock_code.as_ref().map(Scalar::as_text)?;
            if code.is_empty() {
                return None;
            }
            Some(PredictionRecord {
                code: InstrumentCode::new(code),
                name: raw.stock_name.unwrap_or_default(),
                predicted_date: date.clone(),
                predicted_price: raw
                    .current_price
                    .as_ref()
                    .and_then(Scalar::as_number)
                    .unwrap_or(f64::NAN),
                target_price: raw.target_price.as_ref().and_then(Scalar::as_number),
                operation: raw.operation.unwrap_or_default(),
                probability: raw.probability.as_ref().map(Scalar::as_text),
            })
        })
        .collect())
}
