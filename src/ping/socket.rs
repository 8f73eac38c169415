use std::io;
use std::mem::MaybeUninit;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::slice;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{Duration, Instant};

use log::debug;
use rand::Rng;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tcpip::icmp::ICMPMessage;
use tcpip::icmpv6::ICMPv6Message;
use tcpip::ipv4::IPv4Packet;

use super::{ProbeError, Prober, UnreachableReason, resolve_host, validate_packet_size};

/// 受信バッファのサイズ
/// IPv4の最大パケット長に合わせる
const RECV_BUFFER_SIZE: usize = 65_536;

/// ソケットの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SocketKind {
    /// 非特権のICMPソケット
    /// Identifierはカーネルが書き換える
    Datagram,

    /// RAWソケット
    Raw,
}

/// 受信したパケットの判定結果
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplyStatus {
    /// 送信したEcho Requestに対するEcho Reply
    Matched,

    /// 送信したEcho Requestに対するICMPエラー
    Failed(ProbeError),

    /// 関係のないパケット
    Unrelated,
}

/// 送信したEcho Requestの情報
struct PendingEcho<'a> {
    target: IpAddr,
    identifier: u16,
    sequence_number: u16,
    payload: &'a [u8],
    kind: SocketKind,
}

impl PendingEcho<'_> {
    fn is_same_request(&self, identifier: u16, sequence_number: u16) -> bool {
        if self.kind == SocketKind::Raw && identifier != self.identifier {
            return false;
        }
        sequence_number == self.sequence_number
    }

    fn is_reply(&self, source: IpAddr, identifier: u16, sequence_number: u16, data: &[u8]) -> bool {
        source == self.target
            && self.is_same_request(identifier, sequence_number)
            && data == self.payload
    }

    /// 受信したICMPv4メッセージを判定
    ///
    /// IPv4ヘッダーが付いている場合は取り除いてから解析する
    fn classify_v4(&self, source: IpAddr, bytes: &[u8]) -> ReplyStatus {
        let icmp_bytes = match bytes.first() {
            Some(first) if first >> 4 == 4 => match IPv4Packet::try_from(bytes) {
                Ok(pkt) => pkt.payload,
                Err(e) => {
                    debug!("Failed to parse IPv4 packet from {source}: {e}");
                    return ReplyStatus::Unrelated;
                }
            },
            _ => bytes.to_vec(),
        };
        let msg = match ICMPMessage::try_from(&icmp_bytes) {
            Ok(msg) => msg,
            Err(e) => {
                debug!("Failed to parse ICMP message from {source}: {e}");
                return ReplyStatus::Unrelated;
            }
        };

        match msg {
            ICMPMessage::EchoReply(echo) => {
                if self.is_reply(source, echo.identifier, echo.sequence_number, &echo.data) {
                    ReplyStatus::Matched
                } else {
                    ReplyStatus::Unrelated
                }
            }
            ICMPMessage::DestinationUnreachable(dest_msg) => {
                if self.quotes_v4_request(&dest_msg.original_datagram.payload) {
                    ReplyStatus::Failed(ProbeError::DestinationUnreachable(
                        UnreachableReason::V4(dest_msg.code),
                    ))
                } else {
                    ReplyStatus::Unrelated
                }
            }
            ICMPMessage::TimeExceeded(time_msg) => {
                if self.quotes_v4_request(&time_msg.original_datagram.payload) {
                    ReplyStatus::Failed(ProbeError::TimeExceeded)
                } else {
                    ReplyStatus::Unrelated
                }
            }
            msg => {
                debug!("Received message is not Echo Reply: {}", msg.message_type());
                ReplyStatus::Unrelated
            }
        }
    }

    /// 受信したICMPv6メッセージを判定
    fn classify_v6(&self, source: IpAddr, bytes: &[u8]) -> ReplyStatus {
        let msg = match ICMPv6Message::try_from(bytes) {
            Ok(msg) => msg,
            Err(e) => {
                debug!("Failed to parse ICMPv6 message from {source}: {e}");
                return ReplyStatus::Unrelated;
            }
        };

        match msg {
            ICMPv6Message::EchoReply(echo) => {
                if self.is_reply(source, echo.identifier, echo.sequence_number, &echo.data) {
                    ReplyStatus::Matched
                } else {
                    ReplyStatus::Unrelated
                }
            }
            ICMPv6Message::DestinationUnreachable(dest_msg) => {
                if self.quotes_v6_request(&dest_msg.original_packet.payload) {
                    ReplyStatus::Failed(ProbeError::DestinationUnreachable(
                        UnreachableReason::V6(dest_msg.code),
                    ))
                } else {
                    ReplyStatus::Unrelated
                }
            }
            ICMPv6Message::TimeExceeded(time_msg) => {
                if self.quotes_v6_request(&time_msg.original_packet.payload) {
                    ReplyStatus::Failed(ProbeError::TimeExceeded)
                } else {
                    ReplyStatus::Unrelated
                }
            }
            msg => {
                debug!("Received message is not Echo Reply: {}", msg.message_type());
                ReplyStatus::Unrelated
            }
        }
    }

    /// ICMPエラーに引用された元パケットが送信したEcho Requestかを確認
    fn quotes_v4_request(&self, quoted: &[u8]) -> bool {
        match ICMPMessage::try_from(quoted) {
            Ok(ICMPMessage::Echo(echo)) => {
                self.is_same_request(echo.identifier, echo.sequence_number)
            }
            _ => false,
        }
    }

    fn quotes_v6_request(&self, quoted: &[u8]) -> bool {
        match ICMPv6Message::try_from(quoted) {
            Ok(ICMPv6Message::EchoRequest(echo)) => {
                self.is_same_request(echo.identifier, echo.sequence_number)
            }
            _ => false,
        }
    }

    fn classify(&self, source: IpAddr, bytes: &[u8]) -> ReplyStatus {
        match self.target {
            IpAddr::V4(_) => self.classify_v4(source, bytes),
            IpAddr::V6(_) => self.classify_v6(source, bytes),
        }
    }
}

/// ICMPソケットを使ってEchoを送受信するProber
pub(crate) struct SocketProber {
    /// ICMP Echo Requestの送信元識別子
    identifier: u16,

    /// ICMP Echo Requestの送信シーケンス番号
    sequence_counter: AtomicU16,

    /// 応答を待つ時間
    timeout: Duration,
}

impl SocketProber {
    pub(crate) fn new(timeout: Duration) -> Self {
        let mut rng = rand::rng();
        Self {
            identifier: rng.random::<u16>(),
            sequence_counter: AtomicU16::new(0),
            timeout,
        }
    }

    /// ICMPソケットを開く
    ///
    /// 非特権のDGRAMソケットを優先し、開けなければRAWソケットを試す
    fn open(target: IpAddr) -> Result<(Socket, SocketKind), ProbeError> {
        let (domain, protocol) = match target {
            IpAddr::V4(_) => (Domain::IPV4, Protocol::ICMPV4),
            IpAddr::V6(_) => (Domain::IPV6, Protocol::ICMPV6),
        };

        match Socket::new(domain, Type::DGRAM, Some(protocol)) {
            Ok(sock) => Ok((sock, SocketKind::Datagram)),
            Err(e) => {
                debug!("Failed to open ICMP datagram socket ({e}), trying raw socket");
                let sock = Socket::new(domain, Type::RAW, Some(protocol)).map_err(socket_error)?;
                Ok((sock, SocketKind::Raw))
            }
        }
    }

    fn next_sequence_number(&self) -> u16 {
        // fetch_addはオーバーフロー時に0へ戻る
        self.sequence_counter.fetch_add(1, Ordering::Relaxed)
    }

    fn build_request(&self, target: IpAddr, sequence_number: u16, payload: &[u8]) -> Vec<u8> {
        match target {
            IpAddr::V4(_) => {
                ICMPMessage::echo_request(self.identifier, sequence_number, payload).into()
            }
            IpAddr::V6(target) => ICMPv6Message::echo_request(
                self.identifier,
                sequence_number,
                payload,
                Ipv6Addr::UNSPECIFIED, // 送信時にカーネルが書き換える
                target,
            )
            .into(),
        }
    }
}

impl Prober for SocketProber {
    fn probe(&self, host: &str, packet_size: usize) -> Result<Duration, ProbeError> {
        validate_packet_size(packet_size)?;
        let target = resolve_host(host)?;
        let (sock, kind) = Self::open(target)?;

        let sequence_number = self.next_sequence_number();
        let payload = build_payload(packet_size);
        let request = self.build_request(target, sequence_number, &payload);
        let pending = PendingEcho {
            target,
            identifier: self.identifier,
            sequence_number,
            payload: &payload,
            kind,
        };

        let sent_at = Instant::now();
        sock.send_to(&request, &SockAddr::from(SocketAddr::new(target, 0)))
            .map_err(socket_error)?;
        debug!("Sent Echo Request to {target}: seq={sequence_number}, size={packet_size}");

        wait_reply(&sock, &pending, sent_at, sent_at + self.timeout)
    }
}

/// 受信待ちに使うタイムアウトを求める
///
/// 残り時間が1マイクロ秒未満なら期限切れとして`None`を返す
/// timevalでは1マイクロ秒未満が0、つまりタイムアウトなしになる
fn read_timeout(deadline: Instant, now: Instant) -> Option<Duration> {
    let remaining = deadline.saturating_duration_since(now);
    (remaining >= Duration::from_micros(1)).then_some(remaining)
}

/// 期限までに送信したEcho Requestへの応答を待つ
///
/// 関係のないパケットは読み捨てる
fn wait_reply(
    sock: &Socket,
    pending: &PendingEcho<'_>,
    sent_at: Instant,
    deadline: Instant,
) -> Result<Duration, ProbeError> {
    let mut buf = vec![MaybeUninit::<u8>::uninit(); RECV_BUFFER_SIZE];
    loop {
        let Some(remaining) = read_timeout(deadline, Instant::now()) else {
            return Err(ProbeError::Timeout);
        };
        sock.set_read_timeout(Some(remaining)).map_err(socket_error)?;

        let (len, from) = match sock.recv_from(&mut buf) {
            Ok(received) => received,
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) =>
            {
                continue;
            }
            Err(e) => return Err(socket_error(e)),
        };
        let rtt = sent_at.elapsed();

        // SAFETY: recv_fromは先頭lenバイトを初期化している
        let bytes = unsafe { slice::from_raw_parts(buf.as_ptr() as *const u8, len) };
        let Some(source) = from.as_socket().map(|addr| addr.ip()) else {
            continue;
        };

        match pending.classify(source, bytes) {
            ReplyStatus::Matched => {
                debug!(
                    "Received Echo Reply from {source}: seq={}, latency={}us",
                    pending.sequence_number,
                    rtt.as_micros()
                );
                return Ok(rtt);
            }
            ReplyStatus::Failed(e) => {
                debug!("Received ICMP error from {source}: {e}");
                return Err(e);
            }
            ReplyStatus::Unrelated => continue,
        }
    }
}

/// 指定サイズのペイロードを作成
fn build_payload(packet_size: usize) -> Vec<u8> {
    (0..packet_size).map(|i| (i % 256) as u8).collect()
}

fn socket_error(e: io::Error) -> ProbeError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => ProbeError::PermissionDenied,
        kind => ProbeError::Socket(kind),
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use tcpip::icmp::{
        DestinationUnreachableCode as DestinationUnreachableCodeV4, DestinationUnreachableMessage,
        EchoMessage, TimeExceededCode, TimeExceededMessage,
    };
    use tcpip::icmpv6::{self, DestinationUnreachableCode as DestinationUnreachableCodeV6};
    use tcpip::ipv4::{Flags, Protocol};
    use tcpip::ipv6::IPv6Packet;

    use super::*;

    const TARGET_V4: Ipv4Addr = Ipv4Addr::new(192, 0, 2, 10);
    const ROUTER_V4: Ipv4Addr = Ipv4Addr::new(198, 51, 100, 1);
    const LOCAL_V4: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

    fn pending(target: IpAddr, payload: &[u8], kind: SocketKind) -> PendingEcho<'_> {
        PendingEcho {
            target,
            identifier: 0x1234,
            sequence_number: 7,
            payload,
            kind,
        }
    }

    fn ipv4_packet(src: Ipv4Addr, dst: Ipv4Addr, payload: Vec<u8>) -> IPv4Packet {
        IPv4Packet::new(
            0,
            1,
            Flags::default(),
            0,
            64,
            Protocol::ICMP,
            src,
            dst,
            [],
            payload,
        )
    }

    #[test]
    fn test_build_payload() {
        // [正常系] 指定サイズちょうどのペイロード
        assert_eq!(build_payload(56).len(), 56);
        assert_eq!(build_payload(1).len(), 1);
        assert_eq!(build_payload(300)[257], 1);
    }

    #[test]
    fn test_build_request() {
        let prober = SocketProber::new(Duration::from_secs(1));
        let payload = build_payload(56);

        // [正常系] ICMPv4 Echo Requestはヘッダー8バイト + ペイロード
        let request = prober.build_request(IpAddr::V4(TARGET_V4), 3, &payload);
        assert_eq!(request.len(), 64);
        let ICMPMessage::Echo(echo) = ICMPMessage::try_from(&request).unwrap() else {
            panic!("Expected Echo Request");
        };
        assert_eq!(echo.identifier, prober.identifier);
        assert_eq!(echo.sequence_number, 3);
        assert_eq!(echo.data.as_ref(), payload.as_slice());

        // [正常系] ICMPv6 Echo Request
        let request = prober.build_request(IpAddr::V6(Ipv6Addr::LOCALHOST), 4, &payload);
        assert_eq!(request.len(), 64);
        assert_eq!(request[0], 128);
    }

    #[test]
    fn test_next_sequence_number() {
        // [正常系] 連番で増加し、最大値の次は0に戻る
        let prober = SocketProber::new(Duration::from_secs(1));
        assert_eq!(prober.next_sequence_number(), 0);
        assert_eq!(prober.next_sequence_number(), 1);

        prober.sequence_counter.store(u16::MAX, Ordering::Relaxed);
        assert_eq!(prober.next_sequence_number(), u16::MAX);
        assert_eq!(prober.next_sequence_number(), 0);
    }

    #[test]
    fn test_classify_v4_echo_reply() {
        let payload = build_payload(32);
        let target = IpAddr::V4(TARGET_V4);

        // [正常系] IPv4ヘッダー付きのEcho Reply (RAWソケット)
        let raw = pending(target, &payload, SocketKind::Raw);
        let reply: Vec<u8> = EchoMessage::new_reply(0x1234, 7, &payload).into();
        let packet: Vec<u8> = ipv4_packet(TARGET_V4, LOCAL_V4, reply.clone()).into();
        assert_eq!(raw.classify(target, &packet), ReplyStatus::Matched);

        // [正常系] ヘッダーなしのEcho Reply (DGRAMソケット、Identifierは書き換え済み)
        let dgram = pending(target, &payload, SocketKind::Datagram);
        let rewritten: Vec<u8> = EchoMessage::new_reply(0x0042, 7, &payload).into();
        assert_eq!(dgram.classify(target, &rewritten), ReplyStatus::Matched);

        // [異常系] RAWソケットではIdentifier違いを無視
        assert_eq!(raw.classify(target, &rewritten), ReplyStatus::Unrelated);

        // [異常系] シーケンス番号違い
        let other_seq: Vec<u8> = EchoMessage::new_reply(0x1234, 8, &payload).into();
        assert_eq!(raw.classify(target, &other_seq), ReplyStatus::Unrelated);

        // [異常系] ペイロード違い
        let other_data: Vec<u8> = EchoMessage::new_reply(0x1234, 7, [0xFFu8; 32]).into();
        assert_eq!(raw.classify(target, &other_data), ReplyStatus::Unrelated);

        // [異常系] 送信元が宛先と異なる
        assert_eq!(
            raw.classify(IpAddr::V4(ROUTER_V4), &reply),
            ReplyStatus::Unrelated
        );

        // [異常系] 自分が送ったEcho Request
        let request: Vec<u8> = EchoMessage::new_request(0x1234, 7, &payload).into();
        assert_eq!(raw.classify(target, &request), ReplyStatus::Unrelated);

        // [異常系] 解析できないパケット
        assert_eq!(raw.classify(target, &[0x45, 0x00]), ReplyStatus::Unrelated);
    }

    #[test]
    fn test_classify_v4_errors() {
        let payload = build_payload(32);
        let target = IpAddr::V4(TARGET_V4);
        let raw = pending(target, &payload, SocketKind::Raw);
        let request: Vec<u8> = EchoMessage::new_request(0x1234, 7, &payload).into();
        let original = ipv4_packet(LOCAL_V4, TARGET_V4, request);

        // [正常系] 送信したEcho Requestを引用したDestination Unreachable
        let unreachable: Vec<u8> = DestinationUnreachableMessage::new(
            DestinationUnreachableCodeV4::HostUnreachable,
            None,
            original.clone(),
        )
        .unwrap()
        .into();
        let packet: Vec<u8> = ipv4_packet(ROUTER_V4, LOCAL_V4, unreachable).into();
        assert_eq!(
            raw.classify(IpAddr::V4(ROUTER_V4), &packet),
            ReplyStatus::Failed(ProbeError::DestinationUnreachable(UnreachableReason::V4(
                DestinationUnreachableCodeV4::HostUnreachable
            )))
        );

        // [正常系] 送信したEcho Requestを引用したTime Exceeded
        let exceeded: Vec<u8> =
            TimeExceededMessage::new(TimeExceededCode::TtlExceeded, original.clone())
                .unwrap()
                .into();
        let packet: Vec<u8> = ipv4_packet(ROUTER_V4, LOCAL_V4, exceeded).into();
        assert_eq!(
            raw.classify(IpAddr::V4(ROUTER_V4), &packet),
            ReplyStatus::Failed(ProbeError::TimeExceeded)
        );

        // [異常系] 他のEcho Requestを引用したエラーは無視
        let other: Vec<u8> = EchoMessage::new_request(0x9999, 7, &payload).into();
        let exceeded: Vec<u8> = TimeExceededMessage::new(
            TimeExceededCode::TtlExceeded,
            ipv4_packet(LOCAL_V4, TARGET_V4, other),
        )
        .unwrap()
        .into();
        let packet: Vec<u8> = ipv4_packet(ROUTER_V4, LOCAL_V4, exceeded).into();
        assert_eq!(
            raw.classify(IpAddr::V4(ROUTER_V4), &packet),
            ReplyStatus::Unrelated
        );
    }

    #[test]
    fn test_classify_v6() {
        let payload = build_payload(16);
        let local = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 2);
        let target_v6 = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 10);
        let router = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1);
        let target = IpAddr::V6(target_v6);
        let raw = pending(target, &payload, SocketKind::Raw);

        // [正常系] Echo Reply
        let reply: Vec<u8> =
            icmpv6::EchoMessage::new_reply(0x1234, 7, &payload, target_v6, local).into();
        assert_eq!(raw.classify(target, &reply), ReplyStatus::Matched);

        // [正常系] 送信したEcho Requestを引用したDestination Unreachable
        let request: Vec<u8> =
            icmpv6::EchoMessage::new_request(0x1234, 7, &payload, local, target_v6).into();
        let original = IPv6Packet::new(0, 0, Protocol::IPv6ICMP, 64, local, target_v6, request);
        let unreachable: Vec<u8> = icmpv6::DestinationUnreachableMessage::new(
            DestinationUnreachableCodeV6::NoRouteToDestination,
            original.clone(),
            router,
            local,
        )
        .into();
        assert_eq!(
            raw.classify(IpAddr::V6(router), &unreachable),
            ReplyStatus::Failed(ProbeError::DestinationUnreachable(UnreachableReason::V6(
                DestinationUnreachableCodeV6::NoRouteToDestination
            )))
        );

        // [正常系] Time Exceeded
        let exceeded: Vec<u8> = icmpv6::TimeExceededMessage::new(
            icmpv6::TimeExceededCode::HopLimitExceeded,
            original,
            router,
            local,
        )
        .into();
        assert_eq!(
            raw.classify(IpAddr::V6(router), &exceeded),
            ReplyStatus::Failed(ProbeError::TimeExceeded)
        );

        // [異常系] 扱わないメッセージ
        assert_eq!(
            raw.classify(target, &[135, 0, 0, 0, 0, 0, 0, 0]),
            ReplyStatus::Unrelated
        );
    }

    #[test]
    fn test_probe_invalid_arguments() {
        // [異常系] ソケットを開く前に引数を検証する
        let prober = SocketProber::new(Duration::from_secs(1));
        assert_eq!(
            prober.probe("127.0.0.1", 0).unwrap_err(),
            ProbeError::InvalidPacketSize(0)
        );
        assert_eq!(
            prober.probe("", 56).unwrap_err(),
            ProbeError::InvalidHost(String::new())
        );
    }

    #[test]
    fn test_read_timeout() {
        let now = Instant::now();

        // [正常系] 残り時間をそのまま使う
        assert_eq!(
            read_timeout(now + Duration::from_millis(250), now),
            Some(Duration::from_millis(250))
        );
        assert_eq!(
            read_timeout(now + Duration::from_micros(1), now),
            Some(Duration::from_micros(1))
        );

        // [異常系] 1マイクロ秒未満は期限切れ
        assert_eq!(read_timeout(now + Duration::from_nanos(999), now), None);
        assert_eq!(read_timeout(now + Duration::from_nanos(1), now), None);
        assert_eq!(read_timeout(now, now), None);
        assert_eq!(read_timeout(now, now + Duration::from_secs(1)), None);
    }

    /// ループバックに束縛したUDPソケットを作成
    fn loopback_socket() -> (Socket, SocketAddr) {
        let sock = Socket::new(Domain::IPV4, Type::DGRAM, Some(socket2::Protocol::UDP)).unwrap();
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
        sock.bind(&SockAddr::from(addr)).unwrap();
        let addr = sock.local_addr().unwrap().as_socket().unwrap();
        (sock, addr)
    }

    #[test]
    fn test_wait_reply_timeout() {
        // [異常系] 何も届かなければ期限でタイムアウトする
        let (sock, _) = loopback_socket();
        let payload = build_payload(56);
        let pending = pending(IpAddr::V4(TARGET_V4), &payload, SocketKind::Raw);
        let sent_at = Instant::now();

        let result = wait_reply(&sock, &pending, sent_at, sent_at + Duration::from_millis(50));
        assert_eq!(result.unwrap_err(), ProbeError::Timeout);
        assert!(sent_at.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_wait_reply_timeout_with_unrelated_packets() {
        // [異常系] 関係のないパケットが届き続けても期限でタイムアウトする
        let (sock, addr) = loopback_socket();
        let sender = std::thread::spawn(move || {
            let udp = std::net::UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
            for _ in 0..400 {
                let _ = udp.send_to(&[0xff; 8], addr);
                std::thread::sleep(Duration::from_micros(500));
            }
        });

        let payload = build_payload(56);
        let pending = pending(IpAddr::V4(TARGET_V4), &payload, SocketKind::Raw);
        let sent_at = Instant::now();
        let result = wait_reply(&sock, &pending, sent_at, sent_at + Duration::from_millis(50));

        assert_eq!(result.unwrap_err(), ProbeError::Timeout);
        assert!(sent_at.elapsed() < Duration::from_secs(1));
        sender.join().unwrap();
    }

    #[test]
    fn test_socket_error() {
        // [正常系] 権限エラーは専用のエラーになる
        assert_eq!(
            socket_error(io::Error::from(io::ErrorKind::PermissionDenied)),
            ProbeError::PermissionDenied
        );
        assert_eq!(
            socket_error(io::Error::from(io::ErrorKind::NetworkUnreachable)),
            ProbeError::Socket(io::ErrorKind::NetworkUnreachable)
        );
    }
}
