use std::fmt::{self, Display};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MessageTypeError {
    #[error("Unsupported ICMP message type: {0}")]
    UnsupportedValue(u8),
}

/// ICMPメッセージタイプ
///
/// RFC 792で定義されたタイプのうち、Echoの送受信と結果の分類に必要なもの
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Echo Reply
    EchoReply = 0,

    /// Destination Unreachable
    DestinationUnreachable = 3,

    /// Echo
    Echo = 8,

    /// Time Exceeded
    TimeExceeded = 11,
}

impl Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::EchoReply => write!(f, "Echo Reply"),
            MessageType::DestinationUnreachable => write!(f, "Destination Unreachable"),
            MessageType::Echo => write!(f, "Echo Request"),
            MessageType::TimeExceeded => write!(f, "Time Exceeded"),
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = MessageTypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MessageType::EchoReply),
            3 => Ok(MessageType::DestinationUnreachable),
            8 => Ok(MessageType::Echo),
            11 => Ok(MessageType::TimeExceeded),
            value => Err(MessageTypeError::UnsupportedValue(value)),
        }
    }
}

impl From<MessageType> for u8 {
    fn from(value: MessageType) -> Self {
        value as u8
    }
}
