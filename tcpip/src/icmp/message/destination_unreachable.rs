use std::fmt::{self, Display};

use thiserror::Error;

use crate::icmp::MessageType;
use crate::icmp::message::Message;
use crate::ipv4::{IPv4Error, IPv4Packet};
use crate::TryFromBytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DestinationUnreachableCodeError {
    #[error("Invalid destination unreachable code value: {0}")]
    InvalidValue(u8),
}

/// Destination Unreachableメッセージのコード
///
/// RFC 792 / RFC 1122 / RFC 1812 で定義された0〜15
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationUnreachableCode {
    NetworkUnreachable = 0,
    HostUnreachable = 1,
    ProtocolUnreachable = 2,
    PortUnreachable = 3,
    /// Next Hop MTUが付く
    FragmentationNeededAndDFSet = 4,
    SourceRouteFailed = 5,
    DestinationNetworkUnknown = 6,
    DestinationHostUnknown = 7,
    SourceHostIsolated = 8,
    NetworkAdministrativelyProhibited = 9,
    HostAdministrativelyProhibited = 10,
    NetworkUnreachableForTos = 11,
    HostUnreachableForTos = 12,
    CommunicationAdministrativelyProhibited = 13,
    HostPrecedenceViolation = 14,
    PrecedenceCutoffInEffect = 15,
}

impl Display for DestinationUnreachableCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NetworkUnreachable => "Network Unreachable",
            Self::HostUnreachable => "Host Unreachable",
            Self::ProtocolUnreachable => "Protocol Unreachable",
            Self::PortUnreachable => "Port Unreachable",
            Self::FragmentationNeededAndDFSet => "Fragmentation Needed and DF Set",
            Self::SourceRouteFailed => "Source Route Failed",
            Self::DestinationNetworkUnknown => "Destination Network Unknown",
            Self::DestinationHostUnknown => "Destination Host Unknown",
            Self::SourceHostIsolated => "Source Host Isolated",
            Self::NetworkAdministrativelyProhibited => "Network Administratively Prohibited",
            Self::HostAdministrativelyProhibited => "Host Administratively Prohibited",
            Self::NetworkUnreachableForTos => "Network Unreachable for ToS",
            Self::HostUnreachableForTos => "Host Unreachable for ToS",
            Self::CommunicationAdministrativelyProhibited => {
                "Communication Administratively Prohibited"
            }
            Self::HostPrecedenceViolation => "Host Precedence Violation",
            Self::PrecedenceCutoffInEffect => "Precedence Cutoff in Effect",
        };
        write!(f, "{text}")
    }
}

impl TryFrom<u8> for DestinationUnreachableCode {
    type Error = DestinationUnreachableCodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::NetworkUnreachable,
            1 => Self::HostUnreachable,
            2 => Self::ProtocolUnreachable,
            3 => Self::PortUnreachable,
            4 => Self::FragmentationNeededAndDFSet,
            5 => Self::SourceRouteFailed,
            6 => Self::DestinationNetworkUnknown,
            7 => Self::DestinationHostUnknown,
            8 => Self::SourceHostIsolated,
            9 => Self::NetworkAdministrativelyProhibited,
            10 => Self::HostAdministrativelyProhibited,
            11 => Self::NetworkUnreachableForTos,
            12 => Self::HostUnreachableForTos,
            13 => Self::CommunicationAdministrativelyProhibited,
            14 => Self::HostPrecedenceViolation,
            15 => Self::PrecedenceCutoffInEffect,
            value => return Err(DestinationUnreachableCodeError::InvalidValue(value)),
        };
        Ok(code)
    }
}

impl From<DestinationUnreachableCode> for u8 {
    fn from(value: DestinationUnreachableCode) -> Self {
        value as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DestinationUnreachableMessageError {
    #[error("Invalid destination unreachable message type. Expected 3, but got {0}.")]
    InvalidMessageType(u8),
    #[error(
        "Invalid destination unreachable message length. Expected at least 28 bytes, but got {0} bytes."
    )]
    InvalidMessageLength(usize),
    #[error("Original datagram is too short. Expected at least 8 bytes of data, but got {0} bytes.")]
    OriginalDatagramTooShort(usize),
    #[error(transparent)]
    InvalidCode(#[from] DestinationUnreachableCodeError),
    #[error(transparent)]
    InvalidOriginalDatagram(#[from] IPv4Error),
}

/// Destination Unreachable メッセージ
///
/// RFC 792で定義されたDestination Unreachable (Type 3)
/// 元データグラムにはこちらが送ったEcho Requestが引用されている
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationUnreachableMessage {
    pub code: DestinationUnreachableCode,

    pub checksum: u16,

    /// Next Hop MTU (RFC 1191)
    /// `FragmentationNeededAndDFSet`の場合のみ
    pub next_hop_mtu: Option<u16>,

    /// 元のIPヘッダー + データの先頭部分
    pub original_datagram: IPv4Packet,
}

impl DestinationUnreachableMessage {
    pub fn new(
        code: DestinationUnreachableCode,
        next_hop_mtu: Option<u16>,
        mut original_datagram: IPv4Packet,
    ) -> Result<Self, DestinationUnreachableMessageError> {
        if original_datagram.payload.len() < 8 {
            return Err(DestinationUnreachableMessageError::OriginalDatagramTooShort(
                original_datagram.payload.len(),
            ));
        }
        // 先頭の64ビットのみ引用する
        original_datagram.payload.truncate(8);

        let next_hop_mtu = match code {
            DestinationUnreachableCode::FragmentationNeededAndDFSet => next_hop_mtu,
            _ => None,
        };
        let mut msg = Self {
            code,
            checksum: 0,
            next_hop_mtu,
            original_datagram,
        };
        msg.checksum = msg.calculate_checksum();
        Ok(msg)
    }
}

impl TryFromBytes for DestinationUnreachableMessage {
    type Error = DestinationUnreachableMessageError;

    fn try_from_bytes(value: impl AsRef<[u8]>) -> Result<Self, Self::Error> {
        let bytes = value.as_ref();
        // Type(1) + Code(1) + Checksum(2) + Unused(4) + IPv4ヘッダー(20以上)
        if bytes.len() < 28 {
            return Err(DestinationUnreachableMessageError::InvalidMessageLength(
                bytes.len(),
            ));
        }
        if bytes[0] != u8::from(MessageType::DestinationUnreachable) {
            return Err(DestinationUnreachableMessageError::InvalidMessageType(
                bytes[0],
            ));
        }

        let code = DestinationUnreachableCode::try_from(bytes[1])?;
        let next_hop_mtu = match code {
            DestinationUnreachableCode::FragmentationNeededAndDFSet => {
                Some(u16::from_be_bytes([bytes[6], bytes[7]]))
            }
            _ => None,
        };

        Ok(Self {
            code,
            checksum: u16::from_be_bytes([bytes[2], bytes[3]]),
            next_hop_mtu,
            original_datagram: IPv4Packet::try_from(&bytes[8..])?,
        })
    }
}
impl_try_from_bytes!(
    DestinationUnreachableMessage,
    DestinationUnreachableMessageError
);

impl Message for DestinationUnreachableMessage {
    fn msg_type(&self) -> u8 {
        MessageType::DestinationUnreachable.into()
    }

    fn code(&self) -> u8 {
        self.code.into()
    }

    fn total_length(&self) -> usize {
        8 + self.original_datagram.header_len() + self.original_datagram.payload.len()
    }
}

impl From<&DestinationUnreachableMessage> for Vec<u8> {
    fn from(value: &DestinationUnreachableMessage) -> Self {
        let mut bytes = Vec::with_capacity(value.total_length());
        bytes.push(value.msg_type());
        bytes.push(value.code());
        bytes.extend_from_slice(&value.checksum.to_be_bytes());
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend_from_slice(&value.next_hop_mtu.unwrap_or(0).to_be_bytes());
        bytes.extend(Vec::<u8>::from(&value.original_datagram));
        bytes
    }
}

impl From<DestinationUnreachableMessage> for Vec<u8> {
    fn from(value: DestinationUnreachableMessage) -> Self {
        (&value).into()
    }
}
