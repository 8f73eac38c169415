use std::io;
use std::process::Command;
use std::time::Duration;

use log::debug;

use super::{ProbeError, Prober, validate_packet_size};

/// OSのpingコマンドを実行して往復時間を得るProber
pub(crate) struct CommandProber {
    /// 実行するコマンド
    program: String,

    /// `-w`に渡す待ち時間
    timeout: Duration,
}

impl CommandProber {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self::with_program("ping", timeout)
    }

    pub(crate) fn with_program(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// pingコマンドの引数を作成
    ///
    /// `ping -c 1 -w <秒> -s <サイズ> <ホスト>`
    fn args(&self, host: &str, packet_size: usize) -> Vec<String> {
        let deadline = self.timeout.as_secs().max(1);
        vec![
            "-c".to_string(),
            "1".to_string(),
            "-w".to_string(),
            deadline.to_string(),
            "-s".to_string(),
            packet_size.to_string(),
            host.to_string(),
        ]
    }
}

impl Prober for CommandProber {
    fn probe(&self, host: &str, packet_size: usize) -> Result<Duration, ProbeError> {
        validate_packet_size(packet_size)?;
        if host.trim().is_empty() {
            return Err(ProbeError::InvalidHost(host.to_string()));
        }

        let args = self.args(host, packet_size);
        debug!("Running {} {}", self.program, args.join(" "));
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    ProbeError::CommandFailed(format!("{} not found", self.program))
                }
                io::ErrorKind::PermissionDenied => ProbeError::PermissionDenied,
                _ => ProbeError::CommandFailed(e.to_string()),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_ping_output(&stdout) {
            Err(ProbeError::MalformedOutput(_)) if !output.status.success() => {
                // 名前解決失敗などは標準エラー出力にしか理由が出ない
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ProbeError::CommandFailed(
                    match stderr.trim() {
                        "" => output.status.to_string(),
                        reason => reason.to_string(),
                    },
                ))
            }
            result => result,
        }
    }
}

/// pingコマンドの出力から往復時間を取り出す
///
/// `100% packet loss`を含む場合はパケットロス、そうでなければ最初の`time=`から` ms`までを数値として読む
pub(crate) fn parse_ping_output(output: &str) -> Result<Duration, ProbeError> {
    if output.contains("100% packet loss") {
        return Err(ProbeError::PacketLoss);
    }

    let malformed = || ProbeError::MalformedOutput(output.trim().to_string());
    let (_, after) = output.split_once("time=").ok_or_else(malformed)?;
    let (value, _) = after.split_once(" ms").ok_or_else(malformed)?;
    let millis = value.trim().parse::<f64>().map_err(|_| malformed())?;

    Duration::try_from_secs_f64(millis / 1000.0).map_err(|_| malformed())
}
