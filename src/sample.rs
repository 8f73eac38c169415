use std::collections::VecDeque;
use std::time::Duration;

use crate::ping::ProbeError;

/// 有効なサンプルが1つもない場合の`min_ping`の値
pub(crate) const MIN_PING_FALLBACK: i64 = 1000;

/// 1回の計測結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Sample {
    /// 応答までの往復時間
    Latency(Duration),

    /// 応答なし、またはエラー
    Lost(ProbeError),
}

impl Sample {
    /// 失敗を表す値
    pub(crate) const LOST_SENTINEL: f64 = -1.0;

    /// ミリ秒に変換する
    ///
    /// 失敗の場合は`-1.0`
    pub(crate) fn as_millis_sentinel(&self) -> f64 {
        match self {
            Sample::Latency(rtt) => rtt.as_nanos() as f64 / 1_000_000.0,
            Sample::Lost(_) => Self::LOST_SENTINEL,
        }
    }

    /// 整数ミリ秒に変換する
    ///
    /// 小数点以下は切り捨て、失敗の場合は`-1`
    pub(crate) fn as_whole_millis(&self) -> i64 {
        match self {
            Sample::Latency(rtt) => i64::try_from(rtt.as_millis()).unwrap_or(i64::MAX),
            Sample::Lost(_) => -1,
        }
    }

    pub(crate) fn latency(&self) -> Option<Duration> {
        match self {
            Sample::Latency(rtt) => Some(*rtt),
            Sample::Lost(_) => None,
        }
    }
}

impl From<Result<Duration, ProbeError>> for Sample {
    fn from(value: Result<Duration, ProbeError>) -> Self {
        match value {
            Ok(rtt) => Sample::Latency(rtt),
            Err(e) => Sample::Lost(e),
        }
    }
}

/// 0より大きい最小の値を返す
///
/// `MIN_PING_FALLBACK`が上限で、該当する値がなければその値になる
pub(crate) fn min_ping(samples: &[i64]) -> i64 {
    samples
        .iter()
        .copied()
        .filter(|&p| p > 0)
        .fold(MIN_PING_FALLBACK, i64::min)
}

/// 1ホスト分の計測結果の履歴
///
/// 保持数を超えた場合は古いものから捨てる
#[derive(Debug, Clone)]
pub(crate) struct SampleSeries {
    samples: VecDeque<Sample>,
    capacity: usize,

    /// 送信したEcho Requestの総数
    total_sent: u64,

    /// 応答を受け取った総数
    total_received: u64,
}

impl SampleSeries {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            total_sent: 0,
            total_received: 0,
        }
    }

    pub(crate) fn push(&mut self, sample: Sample) {
        self.total_sent += 1;
        if matches!(sample, Sample::Latency(_)) {
            self.total_received += 1;
        }

        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    pub(crate) fn last(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub(crate) fn total_sent(&self) -> u64 {
        self.total_sent
    }

    pub(crate) fn total_received(&self) -> u64 {
        self.total_received
    }

    /// パケットロス率(%)
    pub(crate) fn packet_loss(&self) -> f64 {
        if self.total_sent == 0 {
            return 0.0;
        }
        (1.0 - (self.total_received as f64 / self.total_sent as f64)) * 100.0
    }

    /// 保持しているサンプルのうち応答があったものの平均
    pub(crate) fn average(&self) -> Option<Duration> {
        let latencies = self.iter().filter_map(Sample::latency);
        let (count, total) = latencies.fold((0u32, Duration::ZERO), |(count, total), rtt| {
            (count + 1, total + rtt)
        });
        (count > 0).then(|| total / count)
    }

    /// 保持しているサンプルの最小レイテンシ(整数ミリ秒)
    pub(crate) fn min_ping(&self) -> i64 {
        let millis = self.iter().map(Sample::as_whole_millis).collect::<Vec<_>>();
        min_ping(&millis)
    }
}
