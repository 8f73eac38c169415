use std::fmt::{self, Display};
use std::net::Ipv6Addr;

use thiserror::Error;

use crate::icmpv6::message::Message;
use crate::icmpv6::message_type::ICMPv6MessageType;
use crate::ipv6::{IPv6Error, IPv6Packet};
use crate::TryFromBytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DestinationUnreachableCodeError {
    #[error("Invalid destination unreachable code value: {0}")]
    InvalidValue(u8),
}

/// Destination Unreachable Code
///
/// RFC 4443で定義されたDestination Unreachableメッセージのコード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationUnreachableCode {
    /// No route to destination
    /// 宛先へのルートなし
    NoRouteToDestination = 0,

    /// Communication with destination administratively prohibited
    /// 宛先との通信が管理上禁止されている
    CommunicationProhibited = 1,

    /// Beyond scope of source address
    BeyondScopeOfSourceAddress = 2,

    /// Address unreachable
    /// 宛先アドレスに到達できない
    AddressUnreachable = 3,

    /// Port unreachable
    PortUnreachable = 4,

    /// Source address failed ingress/egress policy
    SourceAddressPolicyViolation = 5,

    /// Reject route to destination
    RejectRouteToDestination = 6,
}

impl Display for DestinationUnreachableCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DestinationUnreachableCode::NoRouteToDestination => {
                write!(f, "No Route to Destination")
            }
            DestinationUnreachableCode::CommunicationProhibited => {
                write!(f, "Communication Prohibited")
            }
            DestinationUnreachableCode::BeyondScopeOfSourceAddress => {
                write!(f, "Beyond Scope of Source Address")
            }
            DestinationUnreachableCode::AddressUnreachable => write!(f, "Address Unreachable"),
            DestinationUnreachableCode::PortUnreachable => write!(f, "Port Unreachable"),
            DestinationUnreachableCode::SourceAddressPolicyViolation => {
                write!(f, "Source Address Failed Ingress/Egress Policy")
            }
            DestinationUnreachableCode::RejectRouteToDestination => {
                write!(f, "Reject Route to Destination")
            }
        }
    }
}

impl TryFrom<u8> for DestinationUnreachableCode {
    type Error = DestinationUnreachableCodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DestinationUnreachableCode::NoRouteToDestination),
            1 => Ok(DestinationUnreachableCode::CommunicationProhibited),
            2 => Ok(DestinationUnreachableCode::BeyondScopeOfSourceAddress),
            3 => Ok(DestinationUnreachableCode::AddressUnreachable),
            4 => Ok(DestinationUnreachableCode::PortUnreachable),
            5 => Ok(DestinationUnreachableCode::SourceAddressPolicyViolation),
            6 => Ok(DestinationUnreachableCode::RejectRouteToDestination),
            value => Err(DestinationUnreachableCodeError::InvalidValue(value)),
        }
    }
}

impl From<DestinationUnreachableCode> for u8 {
    fn from(value: DestinationUnreachableCode) -> Self {
        value as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DestinationUnreachableMessageError {
    #[error("Invalid destination unreachable message type. Expected 1, but got {0}.")]
    InvalidMessageType(u8),
    #[error(
        "Invalid destination unreachable message length. Expected at least 48 bytes, but got {0} bytes."
    )]
    InvalidMessageLength(usize),
    #[error(transparent)]
    InvalidCode(#[from] DestinationUnreachableCodeError),
    #[error(transparent)]
    InvalidOriginalPacket(#[from] IPv6Error),
}

/// ICMPv6 Destination Unreachable メッセージ
///
/// RFC 4443で定義されたDestination Unreachable (Type 1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationUnreachableMessage {
    pub code: DestinationUnreachableCode,

    pub checksum: u16,

    /// 元のIPv6パケット(最小MTUを超えない範囲で切り詰められている)
    pub original_packet: IPv6Packet,
}

impl DestinationUnreachableMessage {
    pub fn new(
        code: DestinationUnreachableCode,
        original_packet: IPv6Packet,
        src: impl Into<Ipv6Addr>,
        dst: impl Into<Ipv6Addr>,
    ) -> Self {
        let mut msg = Self {
            code,
            checksum: 0,
            original_packet,
        };
        msg.checksum = msg.calculate_checksum(src, dst);
        msg
    }
}

impl TryFromBytes for DestinationUnreachableMessage {
    type Error = DestinationUnreachableMessageError;

    fn try_from_bytes(value: impl AsRef<[u8]>) -> Result<Self, Self::Error> {
        let bytes = value.as_ref();
        // Type(1) + Code(1) + Checksum(2) + Unused(4) + IPv6ヘッダー(40)
        if bytes.len() < 48 {
            return Err(DestinationUnreachableMessageError::InvalidMessageLength(
                bytes.len(),
            ));
        }
        if bytes[0] != u8::from(ICMPv6MessageType::DestinationUnreachable) {
            return Err(DestinationUnreachableMessageError::InvalidMessageType(
                bytes[0],
            ));
        }

        Ok(Self {
            code: DestinationUnreachableCode::try_from(bytes[1])?,
            checksum: u16::from_be_bytes([bytes[2], bytes[3]]),
            original_packet: IPv6Packet::try_from(&bytes[8..])?,
        })
    }
}
impl_try_from_bytes!(
    DestinationUnreachableMessage,
    DestinationUnreachableMessageError
);

impl Message for DestinationUnreachableMessage {
    fn message_type(&self) -> ICMPv6MessageType {
        ICMPv6MessageType::DestinationUnreachable
    }

    fn code(&self) -> u8 {
        self.code.into()
    }

    fn total_length(&self) -> usize {
        8 + 40 + self.original_packet.payload.len()
    }
}

impl From<&DestinationUnreachableMessage> for Vec<u8> {
    fn from(value: &DestinationUnreachableMessage) -> Self {
        let mut bytes = Vec::with_capacity(value.total_length());
        bytes.push(value.message_type().into());
        bytes.push(value.code());
        bytes.extend_from_slice(&value.checksum.to_be_bytes());
        bytes.extend_from_slice(&[0; 4]);
        bytes.extend(Vec::<u8>::from(&value.original_packet));
        bytes
    }
}

impl From<DestinationUnreachableMessage> for Vec<u8> {
    fn from(value: DestinationUnreachableMessage) -> Self {
        (&value).into()
    }
}
