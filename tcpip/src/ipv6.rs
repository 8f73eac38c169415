use std::net::Ipv6Addr;

use thiserror::Error;

use crate::ipv4::{Protocol, ProtocolError};
use crate::TryFromBytes;

const HEADER_LENGTH: usize = 40;

/// IPv6パケット処理に関するエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IPv6Error {
    #[error("Invalid IPv6 packet length: must be at least 40 bytes, but got {0} bytes")]
    InvalidPacketLength(usize),
    #[error("Invalid IPv6 Version: must be 6 but {0}")]
    InvalidVersion(u8),
    #[error(transparent)]
    InvalidProtocol(#[from] ProtocolError),
}

/// IPv6パケット
///
/// 固定長40バイトのヘッダーと、それに続くペイロード
/// ICMPv6エラーメッセージに引用された元パケットの解析に使う
///
/// 参照:
/// - [RFC 8200 - Internet Protocol, Version 6 (IPv6) Specification](https://tools.ietf.org/rfc/rfc8200.html)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IPv6Packet {
    /// Traffic Class
    pub traffic_class: u8,

    /// Flow Label (20ビット)
    pub flow_label: u32,

    /// Payload Length
    /// 引用されたパケットでは実際の長さと一致しない
    pub payload_length: u16,

    /// Next Header
    pub next_header: Protocol,

    /// Hop Limit
    pub hop_limit: u8,

    /// Source Address
    pub src: Ipv6Addr,

    /// Destination Address
    pub dst: Ipv6Addr,

    /// Payload
    pub payload: Vec<u8>,
}

impl IPv6Packet {
    pub const VERSION: u8 = 6;

    pub fn new(
        traffic_class: u8,
        flow_label: u32,
        next_header: Protocol,
        hop_limit: u8,
        src: Ipv6Addr,
        dst: Ipv6Addr,
        payload: impl AsRef<[u8]>,
    ) -> Self {
        let payload = payload.as_ref().to_vec();
        Self {
            traffic_class,
            flow_label: flow_label & 0x000F_FFFF,
            payload_length: payload.len() as u16,
            next_header,
            hop_limit,
            src,
            dst,
            payload,
        }
    }
}

impl TryFromBytes for IPv6Packet {
    type Error = IPv6Error;

    fn try_from_bytes(value: impl AsRef<[u8]>) -> Result<Self, Self::Error> {
        let bytes = value.as_ref();
        if bytes.len() < HEADER_LENGTH {
            return Err(IPv6Error::InvalidPacketLength(bytes.len()));
        }

        let version = bytes[0] >> 4;
        if version != Self::VERSION {
            return Err(IPv6Error::InvalidVersion(version));
        }
        let traffic_class = (bytes[0] << 4) | (bytes[1] >> 4);
        let flow_label = u32::from_be_bytes([0, bytes[1] & 0x0F, bytes[2], bytes[3]]);

        let mut src = [0u8; 16];
        src.copy_from_slice(&bytes[8..24]);
        let mut dst = [0u8; 16];
        dst.copy_from_slice(&bytes[24..40]);

        Ok(Self {
            traffic_class,
            flow_label,
            payload_length: u16::from_be_bytes([bytes[4], bytes[5]]),
            next_header: Protocol::try_from(bytes[6])?,
            hop_limit: bytes[7],
            src: Ipv6Addr::from(src),
            dst: Ipv6Addr::from(dst),
            payload: bytes[HEADER_LENGTH..].to_vec(),
        })
    }
}
impl_try_from_bytes!(IPv6Packet, IPv6Error);

impl From<&IPv6Packet> for Vec<u8> {
    fn from(packet: &IPv6Packet) -> Self {
        let mut vec = Vec::with_capacity(HEADER_LENGTH + packet.payload.len());
        let first_word = ((IPv6Packet::VERSION as u32) << 28)
            | ((packet.traffic_class as u32) << 20)
            | (packet.flow_label & 0x000F_FFFF);
        vec.extend_from_slice(&first_word.to_be_bytes());
        vec.extend_from_slice(&packet.payload_length.to_be_bytes());
        vec.push(packet.next_header.into());
        vec.push(packet.hop_limit);
        vec.extend_from_slice(&packet.src.octets());
        vec.extend_from_slice(&packet.dst.octets());
        vec.extend_from_slice(&packet.payload);
        vec
    }
}

impl From<IPv6Packet> for Vec<u8> {
    fn from(packet: IPv6Packet) -> Self {
        (&packet).into()
    }
}
