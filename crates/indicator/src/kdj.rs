//! KDJ 随机指标。
//!
//! RSV = (C - Ln) / (Hn - Ln) * 100，窗口内最高价等于最低价时 RSV = 50。
//! K = (RSV + (m1 - 1) * K') / m1，D = (K + (m2 - 1) * D') / m2，J = 3K - 2D，K、D 初值为 50。

use stockscope_core::common::count_as_f64;
use stockscope_core::indicator::entity::{Kdj, KdjSignal};
use stockscope_core::market::entity::Bar;

/// # Summary
/// KDJ 参数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdjParams {
    // RSV 窗口
    pub n: usize,
    // K 平滑因子
    pub m1: usize,
    // D 平滑因子
    pub m2: usize,
}

impl Default for KdjParams {
    fn default() -> Self {
        Self { n: 9, m1: 3, m2: 3 }
    }
}

#[derive(Debug, Clone, Copy)]
struct Point {
    k: f64,
    d: f64,
    j: f64,
}

/// # Summary
/// 计算最新一期 KDJ 及信号。
///
/// # Logic
/// 1. 从第 n 根 K 线开始逐根迭代 K、D、J。
/// 2. 信号按顺序判断，后者覆盖前者：
///    金叉（本期 K > D 且上期 K <= D）、死叉（本期 K < D 且上期 K >= D）、
///    超买（J > 100）、超卖（J < 0），否则中性。
///
/// # Arguments
/// * `bars`: 按时间升序的 K 线。
/// * `params`: KDJ 参数。
///
/// # Returns
/// K 线少于 n 根时返回 `InsufficientData` 哨兵。
pub fn kdj(bars: &[Bar], params: KdjParams) -> Kdj {
    let KdjParams { n, m1, m2 } = params;
    if n == 0 || m1 == 0 || m2 == 0 || bars.len() < n {
        return Kdj::insufficient();
    }

    let m1 = count_as_f64(m1);
    let m2 = count_as_f64(m2);
    let mut k = 50.0;
    let mut d = 50.0;
    let mut points = Vec::with_capacity(bars.len() + 1 - n);

    for window in bars.windows(n) {
        let high = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let low = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        let close = window[n - 1].close;

        let rsv = if high == low {
            50.0
        } else {
            (close - low) / (high - low) * 100.0
        };
        k = (rsv + (m1 - 1.0) * k) / m1;
        d = (k + (m2 - 1.0) * d) / m2;
        points.push(Point {
            k,
            d,
            j: 3.0 * k - 2.0 * d,
        });
    }

    let Some(last) = points.last().copied() else {
        return Kdj::insufficient();
    };
    let prev = points.len().checked_sub(2).and_then(|i| points.get(i)).copied();

    Kdj {
        k: Some(last.k),
        d: Some(last.d),
        j: Some(last.j),
        signal: classify(last, prev),
    }
}

fn classify(last: Point, prev: Option<Point>) -> KdjSignal {
    let mut signal = KdjSignal::Neutral;
    if let Some(prev) = prev {
        if last.k > last.d && prev.k <= prev.d {
            signal = KdjSignal::GoldenCross;
        }
        if last.k < last.d && prev.k >= prev.d {
            signal = KdjSignal::DeathCross;
        }
    }
    if last.j > 100.0 {
        signal = KdjSignal::Overbought;
    }
    if last.j < 0.0 {
        signal = KdjSignal::Oversold;
    }
    signal
}
