use std::io::{self, BufRead, Write};
use std::thread;

use itertools::Itertools;
use log::{debug, info};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Target;
use crate::core::monitor::{MonitorClient, MonitorError};
use crate::report::format_stats;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ConsoleError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Usage: {0}")]
    MissingArgument(&'static str),
}

/// 標準入力から受け付けるコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConsoleCommand {
    /// `add <host> [name]`
    Add(Target),

    /// `remove <host>`
    Remove(String),

    /// `list`
    List,

    /// `stats <host>`
    Stats(String),

    /// `quit`
    Quit,
}

/// 1行をコマンドとして解釈する
///
/// 空行は`None`
pub(crate) fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, ConsoleError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };

    let command = match command {
        "add" | "a" => {
            let host = words
                .next()
                .ok_or(ConsoleError::MissingArgument("add <host> [name]"))?;
            let name = words.join(" ");
            ConsoleCommand::Add(Target {
                name: if name.is_empty() { host.to_string() } else { name },
                host: host.to_string(),
            })
        }
        "remove" | "rm" => ConsoleCommand::Remove(
            words
                .next()
                .ok_or(ConsoleError::MissingArgument("remove <host>"))?
                .to_string(),
        ),
        "list" | "ls" => ConsoleCommand::List,
        "stats" => ConsoleCommand::Stats(
            words
                .next()
                .ok_or(ConsoleError::MissingArgument("stats <host>"))?
                .to_string(),
        ),
        "quit" | "q" | "exit" => ConsoleCommand::Quit,
        other => return Err(ConsoleError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

/// 標準入力を専用スレッドで読み、1行ずつチャネルに送る
///
/// 読み込みはブロッキングなのでtokioのランタイム上では行わない
pub(crate) fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (line_tx, line_rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line_tx.send(line).is_err() {
                break;
            }
        }
        debug!("Stdin reader is stopping");
    });
    line_rx
}

/// コマンドを1つ実行し、結果を出力する
async fn handle_command<W: Write>(
    client: &MonitorClient,
    command: ConsoleCommand,
    writer: &mut W,
) -> Result<(), MonitorError> {
    match command {
        ConsoleCommand::Add(target) => {
            let host = target.host.trim().to_string();
            client.add(target).await?;
            let _ = writeln!(writer, "added {host}");
        }
        ConsoleCommand::Remove(host) => {
            let target = client.remove(host).await?;
            let _ = writeln!(writer, "removed {}", target.host);
        }
        ConsoleCommand::List => {
            let hosts = client.hosts().await?;
            let _ = writeln!(writer, "{}", hosts.join(", "));
        }
        ConsoleCommand::Stats(host) => {
            let series = client.snapshot(host.as_str()).await?;
            let _ = writeln!(writer, "{}", format_stats(host.trim(), &series));
        }
        ConsoleCommand::Quit => client.shutdown().await?,
    }
    Ok(())
}

/// 入力された行をコマンドとして`MonitorManager`に送り続ける
///
/// `quit`を受け取るか、入力が閉じるか、キャンセルされるまで続ける
pub(crate) async fn run_console<W: Write>(
    token: CancellationToken,
    client: MonitorClient,
    mut line_rx: mpsc::UnboundedReceiver<String>,
    mut writer: W,
) -> io::Result<()> {
    loop {
        let line = tokio::select! {
            _ = token.cancelled() => break,
            line = line_rx.recv() => line,
        };
        let Some(line) = line else {
            debug!("Console input closed");
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(writer, "{e}")?;
                writer.flush()?;
                continue;
            }
        };
        let quit = command == ConsoleCommand::Quit;

        if let Err(e) = handle_command(&client, command, &mut writer).await {
            writeln!(writer, "{e}")?;
        }
        writer.flush()?;

        if quit {
            info!("Quit requested from console");
            break;
        }
    }
    Ok(())
}
