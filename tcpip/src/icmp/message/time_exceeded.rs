use std::fmt::{self, Display};

use thiserror::Error;

use crate::icmp::MessageType;
use crate::icmp::message::Message;
use crate::ipv4::{IPv4Error, IPv4Packet};
use crate::TryFromBytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimeExceededCodeError {
    #[error("Invalid time exceeded code value. Expected 0 or 1, but got {0}.")]
    InvalidValue(u8),
}

/// Time Exceededメッセージのコード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeExceededCode {
    /// Time to Live exceeded in Transit
    TtlExceeded = 0,

    /// Fragment Reassembly Time Exceeded
    FragmentReassemblyTimeExceeded = 1,
}

impl Display for TimeExceededCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeExceededCode::TtlExceeded => write!(f, "TTL Exceeded"),
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
            0 => Ok(TimeExceededCode::TtlExceeded),
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
    #[error("Invalid time exceeded message type. Expected 11, but got {0}.")]
    InvalidMessageType(u8),
    #[error("Invalid time exceeded message length. Expected at least 28 bytes, but got {0} bytes.")]
    InvalidMessageLength(usize),
    #[error("Original datagram is too short. Expected at least 8 bytes of data, but got {0} bytes.")]
    OriginalDatagramTooShort(usize),
    #[error(transparent)]
    InvalidCode(#[from] TimeExceededCodeError),
    #[error(transparent)]
    InvalidOriginalDatagram(#[from] IPv4Error),
}

/// Time Exceeded メッセージ
///
/// RFC 792で定義されたTime Exceeded (Type 11)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeExceededMessage {
    pub code: TimeExceededCode,

    pub checksum: u16,

    /// 元のIPヘッダー + データの先頭部分
    pub original_datagram: IPv4Packet,
}

impl TimeExceededMessage {
    pub fn new(
        code: TimeExceededCode,
        mut original_datagram: IPv4Packet,
    ) -> Result<Self, TimeExceededMessageError> {
        if original_datagram.payload.len() < 8 {
            return Err(TimeExceededMessageError::OriginalDatagramTooShort(
                original_datagram.payload.len(),
            ));
        }
        original_datagram.payload.truncate(8);

        let mut msg = Self {
            code,
            checksum: 0,
            original_datagram,
        };
        msg.checksum = msg.calculate_checksum();
        Ok(msg)
    }
}

impl TryFromBytes for TimeExceededMessage {
    type Error = TimeExceededMessageError;

    fn try_from_bytes(value: impl AsRef<[u8]>) -> Result<Self, Self::Error> {
        let bytes = value.as_ref();
        if bytes.len() < 28 {
            return Err(TimeExceededMessageError::InvalidMessageLength(bytes.len()));
        }
        if bytes[0] != u8::from(MessageType::TimeExceeded) {
            return Err(TimeExceededMessageError::InvalidMessageType(bytes[0]));
        }

        Ok(Self {
            code: TimeExceededCode::try_from(bytes[1])?,
            checksum: u16::from_be_bytes([bytes[2], bytes[3]]),
            original_datagram: IPv4Packet::try_from(&bytes[8..])?,
        })
    }
}
impl_try_from_bytes!(TimeExceededMessage, TimeExceededMessageError);

impl Message for TimeExceededMessage {
    fn msg_type(&self) -> u8 {
        MessageType::TimeExceeded.into()
    }

    fn code(&self) -> u8 {
        self.code.into()
    }

    fn total_length(&self) -> usize {
        8 + self.original_datagram.header_len() + self.original_datagram.payload.len()
    }
}

impl From<&TimeExceededMessage> for Vec<u8> {
    fn from(value: &TimeExceededMessage) -> Self {
        let mut bytes = Vec::with_capacity(value.total_length());
        bytes.push(value.msg_type());
        bytes.push(value.code());
        bytes.extend_from_slice(&value.checksum.to_be_bytes());
        bytes.extend_from_slice(&[0; 4]);
        bytes.extend(Vec::<u8>::from(&value.original_datagram));
        bytes
    }
}

impl From<TimeExceededMessage> for Vec<u8> {
    fn from(value: TimeExceededMessage) -> Self {
        (&value).into()
    }
}
