use std::fmt::Display;
use std::sync::Arc;

use anyhow::{Result, bail};
use futures::future::join_all;
use log::{error, info, warn};
use tokio::signal::ctrl_c;
use tokio::sync::mpsc;
use tokio::task::{self, JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::config::{Config, Target};
use crate::ping::{Prober, ping_icmp};
use crate::report::UpdateMessage;

pub(crate) mod monitor;
pub(crate) mod ping_worker;

use monitor::{MonitorCommand, MonitorManager};

/// 設定された全てのターゲットの監視を開始し、終了するまで待つ
pub(crate) async fn run_ping_monitoring(
    token: CancellationToken,
    config: &Config,
    prober: Arc<dyn Prober>,
    update_sender: mpsc::Sender<UpdateMessage>,
    command_receiver: mpsc::Receiver<MonitorCommand>,
) -> Result<()> {
    let mut manager = MonitorManager::new(token, config, prober, update_sender);
    for target in config.effective_targets() {
        if let Err(e) = manager.add(target.clone()) {
            warn!("Skipping target {} ({}): {e}", target.name, target.host);
        }
    }

    let hosts = manager.hosts();
    if hosts.is_empty() {
        manager.shutdown().await;
        bail!("No valid ping targets");
    }
    info!("ping targets: [{}]", hosts.join(", "));

    manager.run(command_receiver).await;
    Ok(())
}

/// 全てのターゲットを1回ずつ計測する
///
/// 結果はターゲットの順に並び、失敗は`-1.0`になる
pub(crate) async fn run_once(
    config: &Config,
    prober: Arc<dyn Prober>,
) -> Result<Vec<(Target, f64)>> {
    let tasks = config.effective_targets().into_iter().map(|target| {
        let prober = prober.clone();
        let packet_size = config.packet_size;
        task::spawn_blocking(move || {
            let latency = ping_icmp(prober.as_ref(), &target.host, packet_size);
            (target, latency)
        })
    });

    let results = join_all(tasks)
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(results)
}

/// 終了したタスクの結果をログに出す
///
/// 正常に終了した場合のみ`true`を返す
pub(crate) fn log_task_exit<E: Display>(
    task: &str,
    result: Result<Result<(), E>, JoinError>,
) -> bool {
    match result {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            error!("Error has occurred in {task}: {e}");
            false
        }
        Err(e) => {
            error!("The {task} task failed: {e}");
            false
        }
    }
}

pub(crate) fn ctrl_c_handler(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            return;
        }
        println!();
        info!("Ctrl + C received, shutting down...");
        token.cancel();
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mockall::predicate::{always, eq};
    use tokio::time::timeout;

    use super::*;
    use crate::core::monitor;
    use crate::ping::{MockProber, ProbeError};

    #[tokio::test]
    async fn test_run_once() {
        // [正常系] ターゲットの順に結果を返し、失敗は-1.0
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .with(eq("192.0.2.1"), eq(120))
            .returning(|_, _| Ok(Duration::from_micros(2_500)));
        prober
            .expect_probe()
            .with(eq("192.0.2.2"), always())
            .returning(|_, _| Err(ProbeError::Timeout));
        prober
            .expect_probe()
            .with(eq("192.0.2.3"), always())
            .returning(|_, _| Err(ProbeError::PermissionDenied));
        let config = Config {
            targets: vec![
                Target::from_host("192.0.2.1"),
                Target::from_host("192.0.2.2"),
                Target::from_host("192.0.2.3"),
            ],
            packet_size: 120,
            ..Config::default()
        };

        let results = run_once(&config, Arc::new(prober)).await.unwrap();
        assert_eq!(
            results,
            vec![
                (Target::from_host("192.0.2.1"), 2.5),
                (Target::from_host("192.0.2.2"), -1.0),
                (Target::from_host("192.0.2.3"), -1.0),
            ]
        );
    }

    #[tokio::test]
    async fn test_log_task_exit() {
        // [正常系] 正常終了
        let handle = tokio::spawn(async { Ok::<(), anyhow::Error>(()) });
        assert!(log_task_exit("test", handle.await));

        // [異常系] エラーで終了
        let handle = tokio::spawn(async { Err::<(), _>(anyhow::anyhow!("broken")) });
        assert!(!log_task_exit("test", handle.await));

        // [異常系] パニックで終了
        let handle = tokio::spawn(async {
            None::<()>.expect("worker panicked");
            Ok::<(), anyhow::Error>(())
        });
        assert!(!log_task_exit("test", handle.await));
    }

    #[tokio::test]
    async fn test_run_once_default_target() {
        // [正常系] ターゲット未指定ならデフォルトホストを計測する
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .with(eq("1.1.1.1"), eq(56))
            .times(1)
            .returning(|_, _| Ok(Duration::from_millis(9)));

        let results = run_once(&Config::default(), Arc::new(prober)).await.unwrap();
        assert_eq!(results, vec![(Target::from_host("1.1.1.1"), 9.0)]);
    }

    #[tokio::test]
    async fn test_run_ping_monitoring() {
        // [正常系] 設定のターゲットを監視し、Shutdownで終了する
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .returning(|_, _| Ok(Duration::from_millis(4)));
        let config = Config {
            targets: vec![Target::from_host("192.0.2.1")],
            ..Config::default()
        };
        let (update_tx, mut update_rx) = mpsc::channel(100);
        let (client, command_rx) = monitor::channel(10);
        let handle = tokio::spawn(async move {
            run_ping_monitoring(
                CancellationToken::new(),
                &config,
                Arc::new(prober),
                update_tx,
                command_rx,
            )
            .await
        });

        let first = timeout(Duration::from_millis(500), update_rx.recv()).await;
        let Ok(Some(UpdateMessage::Ping(update))) = first else {
            panic!("Expected Ping update");
        };
        assert_eq!(update.target.host, "192.0.2.1");
        assert_eq!(client.hosts().await.unwrap(), vec!["192.0.2.1"]);

        client.shutdown().await.unwrap();
        let result = timeout(Duration::from_millis(500), handle).await;
        assert!(result.unwrap().unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_run_ping_monitoring_no_valid_target() {
        // [異常系] 有効なターゲットが1つもない
        let config = Config {
            targets: vec![Target::from_host(" ")],
            ..Config::default()
        };
        let (update_tx, _update_rx) = mpsc::channel(10);
        let (_client, command_rx) = monitor::channel(10);

        let result = run_ping_monitoring(
            CancellationToken::new(),
            &config,
            Arc::new(MockProber::new()),
            update_tx,
            command_rx,
        )
        .await;
        assert!(result.is_err());
    }
}
