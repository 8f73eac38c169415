use std::fmt::{self, Display};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ICMPv6MessageTypeError {
    #[error("Unsupported ICMPv6 message type: {0}")]
    UnsupportedValue(u8),
}

/// ICMPv6メッセージタイプ
///
/// RFC 4443で定義されたタイプのうちEchoと結果の分類に必要なもの
/// Neighbor Discovery等のメッセージは扱わない
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ICMPv6MessageType {
    DestinationUnreachable = 1,
    TimeExceeded = 3,
    EchoRequest = 128,
    EchoReply = 129,
}

impl Display for ICMPv6MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ICMPv6MessageType::DestinationUnreachable => write!(f, "Destination Unreachable"),
            ICMPv6MessageType::TimeExceeded => write!(f, "Time Exceeded"),
            ICMPv6MessageType::EchoRequest => write!(f, "Echo Request"),
            ICMPv6MessageType::EchoReply => write!(f, "Echo Reply"),
        }
    }
}

impl TryFrom<u8> for ICMPv6MessageType {
    type Error = ICMPv6MessageTypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ICMPv6MessageType::DestinationUnreachable),
            3 => Ok(ICMPv6MessageType::TimeExceeded),
            128 => Ok(ICMPv6MessageType::EchoRequest),
            129 => Ok(ICMPv6MessageType::EchoReply),
            value => Err(ICMPv6MessageTypeError::UnsupportedValue(value)),
        }
    }
}

impl From<ICMPv6MessageType> for u8 {
    fn from(value: ICMPv6MessageType) -> Self {
        value as u8
    }
}
