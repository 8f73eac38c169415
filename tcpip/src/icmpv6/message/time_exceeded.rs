use std::fmt::{self, Display};
use std::net::Ipv6Addr;

use thiserror::Error;

use crate::icmpv6::message::Message;
use crate::icmpv6::message_type::ICMPv6MessageType;
use crate::ipv6::{IPv6Error, IPv6Packet};
use crate::TryFromBytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimeExceededCodeError {
    #[error("Invalid time exceeded code value. Expected 0 or 1, but got {0}.")]
    InvalidValue(u8),
}

/// Time Exceededメッセージのコード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeExceededCode {
    /// Hop limit exceeded in transit
    HopLimitExceeded = 0,

    /// Fragment reassembly time exceeded
    FragmentReassemblyTimeExceeded = 1,
}

impl Display for TimeExceededCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeExceededCode::HopLimitExceeded => write!(f, "Hop Limit Exceeded"),
            TimeExceededCode::FragmentReassemblyTimeExceeded => {
                write!(f, "Fragment Reassembly Time Exceeded")
            }
        }
    }
}

impl TryFrom<u8> for TimeExceededCode {
    type Error = TimeExceededCodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TimeExceededCode::HopLimitExceeded),
            1 => Ok(TimeExceededCode::FragmentReassemblyTimeExceeded),
            value => Err(TimeExceededCodeError::InvalidValue(value)),
        }
    }
}

impl From<TimeExceededCode> for u8 {
    fn from(value: TimeExceededCode) -> Self {
        value as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeExceededMessageError {
    #[error("Invalid time exceeded message type. Expected 3, but got {0}.")]
    InvalidMessageType(u8),
    #[error("Invalid time exceeded message length. Expected at least 48 bytes, but got {0} bytes.")]
    InvalidMessageLength(usize),
    #[error(transparent)]
    InvalidCode(#[from] TimeExceededCodeError),
    #[error(transparent)]
    InvalidOriginalPacket(#[from] IPv6Error),
}

/// ICMPv6 Time Exceeded メッセージ
///
/// RFC 4443で定義されたTime Exceeded (Type 3)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeExceededMessage {
    pub code: TimeExceededCode,

    pub checksum: u16,

    pub original_packet: IPv6Packet,
}

impl TimeExceededMessage {
    pub fn new(
        code: TimeExceededCode,
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

impl TryFromBytes for TimeExceededMessage {
    type Error = TimeExceededMessageError;

    fn try_from_bytes(value: impl AsRef<[u8]>) -> Result<Self, Self::Error> {
        let bytes = value.as_ref();
        if bytes.len() < 48 {
            return Err(TimeExceededMessageError::InvalidMessageLength(bytes.len()));
        }
        if bytes[0] != u8::from(ICMPv6MessageType::TimeExceeded) {
            return Err(TimeExceededMessageError::InvalidMessageType(bytes[0]));
        }

        Ok(Self {
            code: TimeExceededCode::try_from(bytes[1])?,
            checksum: u16::from_be_bytes([bytes[2], bytes[3]]),
            original_packet: IPv6Packet::try_from(&bytes[8..])?,
        })
    }
}
impl_try_from_bytes!(TimeExceededMessage, TimeExceededMessageError);

impl Message for TimeExceededMessage {
    fn message_type(&self) -> ICMPv6MessageType {
        ICMPv6MessageType::TimeExceeded
    }

    fn code(&self) -> u8 {
        self.code.into()
    }

    fn total_length(&self) -> usize {
        8 + 40 + self.original_packet.payload.len()
    }
}

impl From<&TimeExceededMessage> for Vec<u8> {
    fn from(value: &TimeExceededMessage) -> Self {
        let mut bytes = Vec::with_capacity(value.total_length());
        bytes.push(value.message_type().into());
        bytes.push(value.code());
        bytes.extend_from_slice(&value.checksum.to_be_bytes());
        bytes.extend_from_slice(&[0; 4]);
        bytes.extend(Vec::<u8>::from(&value.original_packet));
        bytes
    }
}

impl From<TimeExceededMessage> for Vec<u8> {
    fn from(value: TimeExceededMessage) -> Self {
        (&value).into()
    }
}
