use std::fmt::{self, Display};
use std::io;
use std::net::{IpAddr, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::warn;
use tcpip::icmp::DestinationUnreachableCode as DestinationUnreachableCodeV4;
use tcpip::icmpv6::DestinationUnreachableCode as DestinationUnreachableCodeV6;
use thiserror::Error;

use crate::config::Backend;
use crate::sample::Sample;

pub(crate) mod command;
pub(crate) mod socket;

pub(crate) use self::command::CommandProber;
pub(crate) use self::socket::SocketProber;

/// Destination Unreachableの理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnreachableReason {
    V4(DestinationUnreachableCodeV4),
    V6(DestinationUnreachableCodeV6),
}

impl Display for UnreachableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnreachableReason::V4(code) => write!(f, "{code}"),
            UnreachableReason::V6(code) => write!(f, "{code}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ProbeError {
    #[error("Invalid host: {0:?}")]
    InvalidHost(String),
    #[error("Invalid packet size: {0}")]
    InvalidPacketSize(usize),
    #[error("Failed to resolve {0}. error: {1}")]
    Resolve(String, io::ErrorKind),
    #[error("Permission denied to open ICMP socket")]
    PermissionDenied,
    #[error("Socket error: {0}")]
    Socket(io::ErrorKind),
    #[error("Request timed out")]
    Timeout,
    #[error("Destination unreachable: {0}")]
    DestinationUnreachable(UnreachableReason),
    #[error("Time exceeded")]
    TimeExceeded,
    #[error("100% packet loss")]
    PacketLoss,
    #[error("ping command failed: {0}")]
    CommandFailed(String),
    #[error("Malformed ping output: {0:?}")]
    MalformedOutput(String),
}

/// 1回のICMP Echoを行い、往復時間を返す
///
/// 呼び出しはブロッキングで、最長でもタイムアウトまでに戻る
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Prober: Send + Sync {
    fn probe(&self, host: &str, packet_size: usize) -> Result<Duration, ProbeError>;
}

/// ICMP Echoを1回行い、往復時間(ミリ秒)を返す
///
/// 失敗した場合は理由に関わらず`-1.0`を返す
pub(crate) fn ping_icmp(prober: &dyn Prober, host: &str, packet_size: usize) -> f64 {
    let result = prober.probe(host, packet_size);
    if let Err(e) = &result {
        warn!("No reply from {host}: {e}");
    }
    Sample::from(result).as_millis_sentinel()
}

pub(crate) fn validate_packet_size(packet_size: usize) -> Result<(), ProbeError> {
    if packet_size == 0 {
        return Err(ProbeError::InvalidPacketSize(packet_size));
    }
    Ok(())
}

/// ホスト名またはIPアドレスを解決する
///
/// IPv4とIPv6の両方が得られた場合はIPv4を優先する
pub(crate) fn resolve_host(host: &str) -> Result<IpAddr, ProbeError> {
    if host.trim().is_empty() {
        return Err(ProbeError::InvalidHost(host.to_string()));
    }
    if let Ok(addr) = host.parse::<IpAddr>() {
        return Ok(addr);
    }

    let addrs = (host, 0)
        .to_socket_addrs()
        .map_err(|e| ProbeError::Resolve(host.to_string(), e.kind()))?
        .map(|addr| addr.ip())
        .collect::<Vec<_>>();
    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| ProbeError::Resolve(host.to_string(), io::ErrorKind::NotFound))
}

/// ソケットを優先し、権限がない環境ではpingコマンドに切り替えるProber
pub(crate) struct AutoProber {
    socket: SocketProber,
    command: CommandProber,

    /// 一度権限エラーになったら以降はコマンドのみを使う
    use_command: AtomicBool,
}

impl AutoProber {
    pub(crate) fn new(socket: SocketProber, command: CommandProber) -> Self {
        Self {
            socket,
            command,
            use_command: AtomicBool::new(false),
        }
    }
}

impl Prober for AutoProber {
    fn probe(&self, host: &str, packet_size: usize) -> Result<Duration, ProbeError> {
        if self.use_command.load(Ordering::Relaxed) {
            return self.command.probe(host, packet_size);
        }

        match self.socket.probe(host, packet_size) {
            Err(ProbeError::PermissionDenied) => {
                warn!("No permission to open ICMP socket, falling back to the ping command");
                self.use_command.store(true, Ordering::Relaxed);
                self.command.probe(host, packet_size)
            }
            result => result,
        }
    }
}

/// 設定されたバックエンドのProberを作成
pub(crate) fn build_prober(backend: Backend, timeout: Duration) -> Arc<dyn Prober> {
    match backend {
        Backend::Auto => Arc::new(AutoProber::new(
            SocketProber::new(timeout),
            CommandProber::new(timeout),
        )),
        Backend::Socket => Arc::new(SocketProber::new(timeout)),
        Backend::Command => Arc::new(CommandProber::new(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr};

    use mockall::predicate::eq;

    use super::*;

    #[test]
    fn test_ping_icmp() {
        // [正常系] 往復時間をミリ秒で返す
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .with(eq("example.com"), eq(56))
            .times(1)
            .returning(|_, _| Ok(Duration::from_micros(12_500)));
        assert_eq!(ping_icmp(&prober, "example.com", 56), 12.5);

        // [異常系] タイムアウトは-1.0
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .returning(|_, _| Err(ProbeError::Timeout));
        assert_eq!(ping_icmp(&prober, "10.255.255.1", 56), -1.0);

        // [異常系] 100%パケットロスは-1.0
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .returning(|_, _| Err(ProbeError::PacketLoss));
        assert_eq!(ping_icmp(&prober, "192.0.2.1", 56), -1.0);
    }

    #[test]
    fn test_ping_icmp_passes_arguments_through() {
        // [正常系] ホストとサイズは加工されずにそのまま渡される
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .with(eq(" 8.8.8.8"), eq(1472))
            .times(1)
            .returning(|_, _| Ok(Duration::from_millis(3)));
        assert_eq!(ping_icmp(&prober, " 8.8.8.8", 1472), 3.0);
    }

    #[test]
    fn test_validate_packet_size() {
        // [正常系] 1バイト以上
        assert!(validate_packet_size(1).is_ok());
        assert!(validate_packet_size(65_000).is_ok());

        // [異常系] 0バイト
        assert_eq!(
            validate_packet_size(0).unwrap_err(),
            ProbeError::InvalidPacketSize(0)
        );
    }

    #[test]
    fn test_resolve_host() {
        // [正常系] IPアドレスリテラル
        assert_eq!(
            resolve_host("192.168.1.1").unwrap(),
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1))
        );
        assert_eq!(resolve_host("::1").unwrap(), IpAddr::V6(Ipv6Addr::LOCALHOST));

        // [正常系] localhostはループバックに解決される
        assert!(resolve_host("localhost").unwrap().is_loopback());

        // [異常系] 空のホスト
        assert_eq!(
            resolve_host("   ").unwrap_err(),
            ProbeError::InvalidHost("   ".to_string())
        );
    }

    #[test]
    fn test_probe_error_display() {
        // [正常系] エラー内容の表示
        assert_eq!(ProbeError::Timeout.to_string(), "Request timed out");
        assert_eq!(
            ProbeError::DestinationUnreachable(UnreachableReason::V4(
                DestinationUnreachableCodeV4::HostUnreachable
            ))
            .to_string(),
            "Destination unreachable: Host Unreachable"
        );
    }
}
