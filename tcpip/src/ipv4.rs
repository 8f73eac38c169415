mod flags;
mod protocol;

use std::net::Ipv4Addr;

use thiserror::Error;

pub use self::flags::Flags;
pub use self::protocol::{Protocol, ProtocolError};
use crate::checksum::calculate_internet_checksum;
use crate::TryFromBytes;

const FLAG_MASK: u8 = 0b1110_0000;
const FRAGMENT_OFFSET_MASK: u16 = 0b0001_1111_1111_1111;

/// IPv4パケット処理に関するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IPv4Error {
    #[error("Invalid IPv4 packet length: must be at least 20 bytes, but got {0} bytes")]
    InvalidPacketLength(usize),

    #[error("Invalid IPv4 Version: must be 4 but {0}")]
    InvalidVersion(u8),

    #[error("Invalid IPv4 Header Length: {0} (packet is {1} bytes)")]
    InvalidHeaderLength(u8, usize),

    #[error(transparent)]
    InvalidProtocol(#[from] ProtocolError),
}

/// IPv4パケット
///
/// RAWソケットで受信したICMPの前に付くヘッダーや、
/// ICMPエラーメッセージに引用された元データグラムの解析に使う
///
/// 参照:
/// - [RFC 791 - Internet Protocol](https://tools.ietf.org/rfc/rfc791.txt)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IPv4Packet {
    /// IP Headerの長さ(4Byte単位)
    pub internet_header_length: u8,

    /// Type of Service
    pub type_of_service: u8,

    /// Total Length
    /// ICMPエラーに引用されたパケットでは実際の長さと一致しない
    pub total_length: u16,

    /// Identification
    pub identification: u16,

    /// Fragment Flags
    pub flags: Flags,

    /// Fragment Offset
    pub fragment_offset: u16,

    /// Time to Live
    pub time_to_live: u8,

    /// Protocol
    pub protocol: Protocol,

    /// Header Checksum
    pub header_checksum: u16,

    /// Source IP Address
    pub src: Ipv4Addr,

    /// Destination IP Address
    pub dst: Ipv4Addr,

    /// Options
    pub options: Vec<u8>,

    /// Payload
    pub payload: Vec<u8>,
}

impl IPv4Packet {
    pub const VERSION: u8 = 4;

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        type_of_service: u8,
        identification: u16,
        flags: Flags,
        fragment_offset: u16,
        time_to_live: u8,
        protocol: Protocol,
        src: Ipv4Addr,
        dst: Ipv4Addr,
        options: impl AsRef<[u8]>,
        payload: impl AsRef<[u8]>,
    ) -> Self {
        let mut options = options.as_ref().to_vec();
        // オプションフィールドは4バイト境界でパディングする
        let remainder = options.len() % 4;
        if remainder != 0 {
            options.extend(vec![0; 4 - remainder]);
        }
        let header_length = 20 + options.len();
        let payload = payload.as_ref().to_vec();

        let mut packet = Self {
            internet_header_length: (header_length / 4) as u8,
            type_of_service,
            total_length: (header_length + payload.len()) as u16,
            identification,
            flags,
            fragment_offset,
            time_to_live,
            protocol,
            header_checksum: 0, // checksumは後で計算する
            src,
            dst,
            options,
            payload,
        };
        packet.header_checksum = calculate_internet_checksum(&packet.header_bytes());
        packet
    }

    /// ヘッダーのバイト長
    pub fn header_len(&self) -> usize {
        self.internet_header_length as usize * 4
    }

    pub fn validate_checksum(&self) -> bool {
        calculate_internet_checksum(&self.header_bytes()) == 0
    }

    fn header_bytes(&self) -> Vec<u8> {
        let mut vec = Vec::with_capacity(self.header_len());

        vec.push((Self::VERSION << 4) | self.internet_header_length);
        vec.push(self.type_of_service);
        vec.extend_from_slice(&self.total_length.to_be_bytes());
        vec.extend_from_slice(&self.identification.to_be_bytes());
        let flags_byte: u8 = self.flags.into();
        let flags_and_offset =
            ((flags_byte as u16) << 8) | (self.fragment_offset & FRAGMENT_OFFSET_MASK);
        vec.extend_from_slice(&flags_and_offset.to_be_bytes());
        vec.push(self.time_to_live);
        vec.push(self.protocol.into());
        vec.extend_from_slice(&self.header_checksum.to_be_bytes());
        vec.extend_from_slice(&self.src.octets());
        vec.extend_from_slice(&self.dst.octets());
        vec.extend_from_slice(&self.options);
        vec
    }
}

impl TryFromBytes for IPv4Packet {
    type Error = IPv4Error;

    fn try_from_bytes(value: impl AsRef<[u8]>) -> Result<Self, Self::Error> {
        let value = value.as_ref();
        if value.len() < 20 {
            return Err(IPv4Error::InvalidPacketLength(value.len()));
        }

        let version = value[0] >> 4;
        if version != Self::VERSION {
            return Err(IPv4Error::InvalidVersion(version));
        }
        let ihl = value[0] & 0x0F;
        let header_end = ihl as usize * 4;
        if ihl < 5 || header_end > value.len() {
            return Err(IPv4Error::InvalidHeaderLength(ihl, value.len()));
        }

        Ok(Self {
            internet_header_length: ihl,
            type_of_service: value[1],
            total_length: u16::from_be_bytes([value[2], value[3]]),
            identification: u16::from_be_bytes([value[4], value[5]]),
            flags: Flags::from(value[6] & FLAG_MASK),
            fragment_offset: u16::from_be_bytes([value[6] & !FLAG_MASK, value[7]]),
            time_to_live: value[8],
            protocol: Protocol::try_from(value[9])?,
            header_checksum: u16::from_be_bytes([value[10], value[11]]),
            src: Ipv4Addr::new(value[12], value[13], value[14], value[15]),
            dst: Ipv4Addr::new(value[16], value[17], value[18], value[19]),
            options: value[20..header_end].to_vec(),
            // 引用パケットのTotal Lengthは信用できないため残り全てをペイロードとする
            payload: value[header_end..].to_vec(),
        })
    }
}
impl_try_from_bytes!(IPv4Packet, IPv4Error);

impl From<&IPv4Packet> for Vec<u8> {
    fn from(packet: &IPv4Packet) -> Self {
        let mut vec = packet.header_bytes();
        vec.extend_from_slice(&packet.payload);
        vec
    }
}

impl From<IPv4Packet> for Vec<u8> {
    fn from(packet: IPv4Packet) -> Self {
        (&packet).into()
    }
}
