use std::io::{self, Write};

use chrono::{DateTime, Local};
use log::{debug, info};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Target;
use crate::sample::{Sample, SampleSeries};

#[derive(Debug, Clone)]
pub(crate) enum UpdateMessage {
    Ping(PingUpdate),
    Removed(Target),
}

#[derive(Debug, Clone)]
pub(crate) struct PingUpdate {
    pub(crate) target: Target,

    /// 今回の計測結果
    pub(crate) sample: Sample,

    /// 保持しているサンプルの最小レイテンシ(ミリ秒)
    pub(crate) min_ping: i64,

    /// パケットロス率(%)
    pub(crate) packet_loss: f64,

    pub(crate) timestamp: DateTime<Local>,
}

impl PingUpdate {
    pub(crate) fn new(target: Target, sample: Sample, series: &SampleSeries) -> Self {
        Self {
            target,
            sample,
            min_ping: series.min_ping(),
            packet_loss: series.packet_loss(),
            timestamp: Local::now(),
        }
    }
}

/// 1件の更新を1行の文字列にする
pub(crate) fn format_update(message: &UpdateMessage) -> String {
    match message {
        UpdateMessage::Ping(update) => {
            let time = update.timestamp.format("%H:%M:%S");
            let Target { name, host } = &update.target;
            match &update.sample {
                Sample::Latency(_) => format!(
                    "{time} {name} ({host}) {:.3} ms  min={} loss={:.1}%",
                    update.sample.as_millis_sentinel(),
                    update.min_ping,
                    update.packet_loss
                ),
                Sample::Lost(e) => format!("{time} {name} ({host}) {e}"),
            }
        }
        UpdateMessage::Removed(Target { name, host }) => {
            format!("{} {name} ({host}) removed", Local::now().format("%H:%M:%S"))
        }
    }
}

/// 履歴の統計を1行の文字列にする
pub(crate) fn format_stats(host: &str, series: &SampleSeries) -> String {
    let millis = |sample: &Sample| format!("{:.3} ms", sample.as_millis_sentinel());
    let average = series
        .average()
        .map_or_else(|| "-".to_string(), |avg| millis(&Sample::Latency(avg)));
    let last = match series.last() {
        Some(sample @ Sample::Latency(_)) => millis(sample),
        Some(Sample::Lost(e)) => e.to_string(),
        None => "-".to_string(),
    };
    format!(
        "{host}: samples={} sent={} received={} loss={:.1}% avg={average} min={} last={last}",
        series.len(),
        series.total_sent(),
        series.total_received(),
        series.packet_loss(),
        series.min_ping()
    )
}

/// 更新を受け取って1行ずつ出力する
///
/// チャネルが閉じるかキャンセルされるまで続ける
pub(crate) async fn run_reporter<W: Write>(
    token: CancellationToken,
    mut update_rx: mpsc::Receiver<UpdateMessage>,
    mut writer: W,
) -> io::Result<()> {
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                info!("Reporter is stopping");
                break;
            }
            message = update_rx.recv() => {
                let Some(message) = message else {
                    debug!("Update channel closed");
                    break;
                };
                writeln!(writer, "{}", format_update(&message))?;
                writer.flush()?;
            }
        }
    }
    Ok(())
}
