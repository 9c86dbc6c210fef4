use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// # Summary
/// 证券代码实体，代表一只 A 股标的的纯数字代码（例如 600519）。
///
/// # Invariants
/// - 内部存储的是去除空白与交易所前缀后的代码。
/// - 交易所推导是纯函数且全覆盖：任何代码都能得到一个交易所，未知首位默认上交所。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentCode(String);

impl InstrumentCode {
    /// # Summary
    /// 以宽松方式构造代码，不做合法性校验。
    ///
    /// # Logic
    /// 1. 去除首尾空白。
    /// 2. 若带有 `sh` / `sz` / `bj` 前缀（大小写不敏感），剥离之。
    ///
    /// # Arguments
    /// * `raw`: 原始代码文本。
    ///
    /// # Returns
    /// 规范化后的代码。
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();
        let stripped = ["sh", "sz", "bj"]
            .iter()
            .find_map(|p| {
                trimmed
                    .get(..2)
                    .filter(|head| head.eq_ignore_ascii_case(p))
                    .map(|_| &trimmed[2..])
            })
            .unwrap_or(trimmed);
        Self(stripped.to_string())
    }

    /// 代码文本
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// # Summary
    /// 根据首位数字推导所属交易所。
    ///
    /// # Logic
    /// 1. `6` 开头为上交所。
    /// 2. `0` / `3` 开头为深交所。
    /// 3. `4` / `8` 开头为北交所。
    /// 4. 其余情况（含空代码）回落到上交所。
    ///
    /// # Returns
    /// 交易所枚举。
    pub fn venue(&self) -> Venue {
        match self.0.chars().next() {
            Some('0') | Some('3') => Venue::Shenzhen,
            Some('4') | Some('8') => Venue::Beijing,
            _ => Venue::Shanghai,
        }
    }

    /// 带交易所前缀的完整代码，例如 `sh600519`
    pub fn prefixed(&self) -> String {
        format!("{}{}", self.venue().prefix(), self.0)
    }
}

impl FromStr for InstrumentCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = Self::new(s);
        if code.0.is_empty() || !code.0.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("Invalid instrument code: {}", s));
        }
        Ok(code)
    }
}

impl fmt::Display for InstrumentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// # Summary
/// 证券所属交易所。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    // 上海证券交易所
    Shanghai,
    // 深圳证券交易所
    Shenzhen,
    // 北京证券交易所
    Beijing,
}

impl Venue {
    /// 行情接口使用的两位小写前缀
    pub fn prefix(&self) -> &'static str {
        match self {
            Venue::Shanghai => "sh",
            Venue::Shenzhen => "sz",
            Venue::Beijing => "bj",
        }
    }
}

/// # Summary
/// 历史 K 线采样粒度。
///
/// # Invariants
/// - 对应数据源的 `scale` 参数（分钟）：5 / 60 / 240。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Sampling {
    // 5 分钟线
    Minute5,
    // 60 分钟线
    Hour1,
    // 日线（240 分钟为一个交易日）
    #[default]
    Day1,
}

impl Sampling {
    /// 数据源 `scale` 参数值（分钟）
    pub fn minutes(&self) -> u32 {
        match self {
            Sampling::Minute5 => 5,
            Sampling::Hour1 => 60,
            Sampling::Day1 => 240,
        }
    }
}

impl FromStr for Sampling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "5m" | "5" | "minute5" => Ok(Sampling::Minute5),
            "1h" | "60" | "hour1" => Ok(Sampling::Hour1),
            "1d" | "240" | "day1" => Ok(Sampling::Day1),
            _ => Err(format!("Unknown Sampling: {}", s)),
        }
    }
}

impl fmt::Display for Sampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sampling::Minute5 => write!(f, "5m"),
            Sampling::Hour1 => write!(f, "1h"),
            Sampling::Day1 => write!(f, "1d"),
        }
    }
}

/// 计数转浮点，用于均值与比率计算。计数远小于 2^52，不存在精度损失。
#[allow(clippy::cast_precision_loss)]
pub fn count_as_f64(n: usize) -> f64 {
    n as f64
}
