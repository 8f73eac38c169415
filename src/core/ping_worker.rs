use std::sync::Arc;

use chrono::Duration;
use log::{debug, info, warn};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use crate::config::Target;
use crate::ping::Prober;
use crate::report::{PingUpdate, UpdateMessage};
use crate::sample::{Sample, SampleSeries};

#[derive(Debug, Error)]
pub(crate) enum PingWorkerError {
    #[error("Invalid interval: {0}")]
    InvalidInterval(Duration),
    #[error("Probe task failed: {0}")]
    ProbeTaskFailed(#[from] task::JoinError),
    #[error("Channel send error")]
    ChannelSendError,
}

/// 1ホストを一定間隔で計測し続けるワーカー
///
/// 計測は前回の計測が終わってから次を始めるため、同じホストに対して並行しない
pub(crate) struct PingWorker {
    token: CancellationToken,

    target: Target,

    /// 計測間隔
    interval: Duration,

    /// ICMP Echoのペイロードサイズ
    packet_size: usize,

    prober: Arc<dyn Prober>,

    /// 計測結果の履歴
    series: Arc<Mutex<SampleSeries>>,

    /// UpdateMessage送信用チャネル
    update_tx: mpsc::Sender<UpdateMessage>,
}

impl PingWorker {
    pub(crate) fn new(
        token: CancellationToken,
        target: Target,
        interval: Duration,
        packet_size: usize,
        prober: Arc<dyn Prober>,
        series: Arc<Mutex<SampleSeries>>,
        update_tx: mpsc::Sender<UpdateMessage>,
    ) -> Self {
        Self {
            token,
            target,
            interval,
            packet_size,
            prober,
            series,
            update_tx,
        }
    }

    pub(crate) async fn run(self) -> Result<(), PingWorkerError> {
        info!("Starting Ping Worker for target: {}", self.target.host);

        let period = self
            .interval
            .to_std()
            .ok()
            .filter(|period| !period.is_zero())
            .ok_or(PingWorkerError::InvalidInterval(self.interval))?;
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                _ = self.token.cancelled() => break,
                result = self.sample_once() => result?,
            }
        }

        info!("Ping Worker for target {} is stopping", self.target.host);
        Ok(())
    }

    /// 1回計測して履歴に追加し、更新を通知する
    async fn sample_once(&self) -> Result<(), PingWorkerError> {
        let prober = self.prober.clone();
        let host = self.target.host.clone();
        let packet_size = self.packet_size;
        let result = task::spawn_blocking(move || prober.probe(&host, packet_size)).await?;

        match &result {
            Ok(rtt) => debug!(
                "Received Echo Reply from {}: latency={}us",
                self.target.host,
                rtt.as_micros()
            ),
            Err(e) => warn!("Ping to {} failed: {e}", self.target.host),
        }

        let sample = Sample::from(result);
        let update = {
            let mut series = self.series.lock();
            series.push(sample.clone());
            debug!(
                "{}: sent={}, received={}, avg={:?}",
                self.target.host,
                series.total_sent(),
                series.total_received(),
                series.average()
            );
            PingUpdate::new(self.target.clone(), sample, &series)
        };

        self.update_tx
            .send(UpdateMessage::Ping(update))
            .await
            .map_err(|_| PingWorkerError::ChannelSendError)
    }
}
