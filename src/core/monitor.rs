use std::sync::Arc;

use chrono::Duration;
use futures::future::join_all;
use fxhash::FxHashMap;
use itertools::Itertools;
use log::{debug, info, warn};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::ping_worker::{PingWorker, PingWorkerError};
use crate::config::{Config, Target};
use crate::ping::Prober;
use crate::report::UpdateMessage;
use crate::sample::SampleSeries;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum MonitorError {
    #[error("Please enter a valid address")]
    InvalidHost,
    #[error("{0} is already monitored")]
    AlreadyAdded(String),
    #[error("{0} is not monitored")]
    NotFound(String),
    #[error("Monitor manager has stopped")]
    ManagerStopped,
}

type Reply<T> = oneshot::Sender<Result<T, MonitorError>>;

pub(crate) enum MonitorCommand {
    Add { target: Target, reply: Reply<()> },
    Remove { host: String, reply: Reply<Target> },
    Snapshot { host: String, reply: Reply<SampleSeries> },
    Hosts { reply: oneshot::Sender<Vec<String>> },
    Shutdown,
}

/// 監視中のホスト1つ分のワーカーの情報
struct MonitorHandle {
    target: Target,
    token: CancellationToken,
    series: Arc<Mutex<SampleSeries>>,
    join: JoinHandle<Result<(), PingWorkerError>>,
}

impl MonitorHandle {
    /// ワーカーを停止して終了を待つ
    async fn stop(self) -> Target {
        self.token.cancel();
        match self.join.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Ping Worker for {} exited with error: {e}", self.target.host),
            Err(e) => warn!("Ping Worker for {} panicked: {e}", self.target.host),
        }
        self.target
    }
}

/// ホストごとのPing Workerを管理する
///
/// 追加と削除はコマンドとして`run`に届き、1つずつ順番に処理される
pub(crate) struct MonitorManager {
    token: CancellationToken,
    interval: Duration,
    packet_size: usize,
    buffer_size: usize,
    prober: Arc<dyn Prober>,
    update_tx: mpsc::Sender<UpdateMessage>,

    /// 前後の空白を取り除いたホストをキーとする
    monitors: FxHashMap<String, MonitorHandle>,
}

impl MonitorManager {
    pub(crate) fn new(
        token: CancellationToken,
        config: &Config,
        prober: Arc<dyn Prober>,
        update_tx: mpsc::Sender<UpdateMessage>,
    ) -> Self {
        Self {
            token,
            interval: config.interval,
            packet_size: config.packet_size,
            buffer_size: config.buffer_size,
            prober,
            update_tx,
            monitors: FxHashMap::default(),
        }
    }

    /// ホストの監視を開始する
    pub(crate) fn add(&mut self, target: Target) -> Result<(), MonitorError> {
        let host = target.host.trim().to_string();
        if host.is_empty() {
            return Err(MonitorError::InvalidHost);
        }
        if self.monitors.contains_key(&host) {
            return Err(MonitorError::AlreadyAdded(host));
        }

        let name = match target.name.trim() {
            "" => host.clone(),
            name => name.to_string(),
        };
        let target = Target {
            name,
            host: host.clone(),
        };

        let token = self.token.child_token();
        let series = Arc::new(Mutex::new(SampleSeries::new(self.buffer_size)));
        let worker = PingWorker::new(
            token.clone(),
            target.clone(),
            self.interval,
            self.packet_size,
            self.prober.clone(),
            series.clone(),
            self.update_tx.clone(),
        );
        let join = tokio::spawn(worker.run());
        info!("Started monitoring {} ({})", target.name, target.host);

        self.monitors.insert(
            host,
            MonitorHandle {
                target,
                token,
                series,
                join,
            },
        );
        Ok(())
    }

    /// ホストの監視を終了する
    pub(crate) async fn remove(&mut self, host: &str) -> Result<Target, MonitorError> {
        let host = host.trim();
        let handle = self
            .monitors
            .remove(host)
            .ok_or_else(|| MonitorError::NotFound(host.to_string()))?;

        let target = handle.stop().await;
        info!("Stopped monitoring {} ({})", target.name, target.host);
        if self
            .update_tx
            .send(UpdateMessage::Removed(target.clone()))
            .await
            .is_err()
        {
            debug!("Update channel closed");
        }
        Ok(target)
    }

    /// 監視中のホストの一覧
    pub(crate) fn hosts(&self) -> Vec<String> {
        self.monitors.keys().cloned().sorted().collect()
    }

    /// 計測結果の履歴のコピーを取得
    pub(crate) fn snapshot(&self, host: &str) -> Result<SampleSeries, MonitorError> {
        let host = host.trim();
        self.monitors
            .get(host)
            .map(|handle| handle.series.lock().clone())
            .ok_or_else(|| MonitorError::NotFound(host.to_string()))
    }

    /// 全てのワーカーを停止する
    pub(crate) async fn shutdown(&mut self) {
        let stopping = self.monitors.drain().map(|(_, handle)| handle.stop());
        let targets = join_all(stopping).await;
        debug!("Stopped {} Ping Workers", targets.len());
    }

    /// コマンドを処理し続ける
    ///
    /// `Shutdown`を受け取るか、キャンセルされるか、全てのクライアントが閉じるまで続ける
    pub(crate) async fn run(mut self, mut command_rx: mpsc::Receiver<MonitorCommand>) {
        let token = self.token.clone();
        loop {
            let command = tokio::select! {
                _ = token.cancelled() => break,
                command = command_rx.recv() => command,
            };
            match command {
                Some(MonitorCommand::Add { target, reply }) => {
                    let _ = reply.send(self.add(target));
                }
                Some(MonitorCommand::Remove { host, reply }) => {
                    let result = self.remove(&host).await;
                    let _ = reply.send(result);
                }
                Some(MonitorCommand::Snapshot { host, reply }) => {
                    let _ = reply.send(self.snapshot(&host));
                }
                Some(MonitorCommand::Hosts { reply }) => {
                    let _ = reply.send(self.hosts());
                }
                Some(MonitorCommand::Shutdown) | None => break,
            }
        }

        info!("Monitor manager is stopping");
        self.shutdown().await;
    }
}

/// `MonitorManager`にコマンドを送るためのハンドル
#[derive(Clone)]
pub(crate) struct MonitorClient {
    tx: mpsc::Sender<MonitorCommand>,
}

/// クライアントとコマンド受信用チャネルを作成
pub(crate) fn channel(buffer: usize) -> (MonitorClient, mpsc::Receiver<MonitorCommand>) {
    let (tx, rx) = mpsc::channel(buffer);
    (MonitorClient { tx }, rx)
}

impl MonitorClient {
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> MonitorCommand,
    ) -> Result<T, MonitorError> {
        let (reply, reply_rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| MonitorError::ManagerStopped)?;
        reply_rx.await.map_err(|_| MonitorError::ManagerStopped)
    }

    pub(crate) async fn add(&self, target: Target) -> Result<(), MonitorError> {
        self.request(|reply| MonitorCommand::Add { target, reply }).await?
    }

    pub(crate) async fn remove(&self, host: impl Into<String>) -> Result<Target, MonitorError> {
        let host = host.into();
        self.request(|reply| MonitorCommand::Remove { host, reply }).await?
    }

    pub(crate) async fn snapshot(
        &self,
        host: impl Into<String>,
    ) -> Result<SampleSeries, MonitorError> {
        let host = host.into();
        self.request(|reply| MonitorCommand::Snapshot { host, reply }).await?
    }

    pub(crate) async fn hosts(&self) -> Result<Vec<String>, MonitorError> {
        self.request(|reply| MonitorCommand::Hosts { reply }).await
    }

    pub(crate) async fn shutdown(&self) -> Result<(), MonitorError> {
        self.tx
            .send(MonitorCommand::Shutdown)
            .await
            .map_err(|_| MonitorError::ManagerStopped)
    }
}
