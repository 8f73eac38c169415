use std::io;

use anyhow::Result;
use config::Config;
use env_logger::Env;
use log::error;
use report::UpdateMessage;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;
use crate::core::monitor;

mod cli;
mod config;
mod console;
mod core;
mod ping;
mod report;
mod sample;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("error"));
    color_eyre::install().map_err(|e| {
        error!("Failed to install color_eyre: {e}");
        anyhow::anyhow!("Failed to install color_eyre")
    })?;

    let cli = Cli::parse();
    let mut config = Config::load_or_default(cli.config_path(), cli.config_required())?;
    cli.apply(&mut config);
    config.validate()?;

    let prober = ping::build_prober(config.backend, config.timeout.to_std()?);

    if cli.once {
        for (target, latency) in core::run_once(&config, prober).await? {
            println!("{} {latency}", target.host);
        }
        return Ok(());
    }

    // UpdateMessage用のチャネルを作成
    let (update_sender, update_receiver) = mpsc::channel::<UpdateMessage>(1000);
    let (monitor_client, command_receiver) = monitor::channel(16);
    let token = CancellationToken::new();
    let _ctrl_c_handle = core::ctrl_c_handler(token.clone());

    // Ping監視タスクを起動
    let ping_token = token.clone();
    let ping_handle = tokio::spawn(async move {
        core::run_ping_monitoring(
            ping_token,
            &config,
            prober,
            update_sender,
            command_receiver,
        )
        .await
    });

    // 計測結果の出力タスクを起動
    let reporter_handle = tokio::spawn(report::run_reporter(
        token.clone(),
        update_receiver,
        io::stdout(),
    ));

    // 標準入力からのコマンドを受け付ける
    let console_token = token.clone();
    let line_receiver = console::spawn_stdin_reader();
    tokio::spawn(async move {
        if let Err(e) =
            console::run_console(console_token, monitor_client, line_receiver, io::stdout()).await
        {
            error!("Error has occurred in console: {e}");
        }
    });

    // 監視が終わったら残りのタスクも止める
    core::log_task_exit("ping monitoring", ping_handle.await);
    token.cancel();
    core::log_task_exit("reporter", reporter_handle.await);

    Ok(())
}
