mod message;
mod message_type;

use std::net::Ipv6Addr;

use thiserror::Error;

pub use self::message::{
    DestinationUnreachableCode, DestinationUnreachableCodeError, DestinationUnreachableMessage,
    DestinationUnreachableMessageError, EchoMessage, EchoMessageError, Message, TimeExceededCode,
    TimeExceededCodeError, TimeExceededMessage, TimeExceededMessageError,
};
pub use self::message_type::{ICMPv6MessageType, ICMPv6MessageTypeError};
use crate::TryFromBytes;

/// ICMPv6メッセージ処理に関するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ICMPv6Error {
    #[error("Invalid ICMPv6 packet length: must be at least 4 bytes, but got {0} bytes")]
    InvalidPacketLength(usize),
    #[error(transparent)]
    InvalidMessageType(#[from] ICMPv6MessageTypeError),
    #[error(transparent)]
    InvalidEchoMessage(#[from] EchoMessageError),
    #[error(transparent)]
    InvalidDestinationUnreachableMessage(#[from] DestinationUnreachableMessageError),
    #[error(transparent)]
    InvalidTimeExceededMessage(#[from] TimeExceededMessageError),
}

/// ICMPv6メッセージ
///
/// 参照:
/// - [RFC 4443 - Internet Control Message Protocol (ICMPv6) for IPv6](https://tools.ietf.org/rfc/rfc4443.txt)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ICMPv6Message {
    DestinationUnreachable(DestinationUnreachableMessage),
    TimeExceeded(TimeExceededMessage),
    EchoRequest(EchoMessage),
    EchoReply(EchoMessage),
}

impl ICMPv6Message {
    /// Echo Requestメッセージを作成
    pub fn echo_request(
        identifier: u16,
        sequence_number: u16,
        data: impl AsRef<[u8]>,
        src: impl Into<Ipv6Addr>,
        dst: impl Into<Ipv6Addr>,
    ) -> Self {
        let echo_msg = EchoMessage::new_request(identifier, sequence_number, data, src, dst);
        ICMPv6Message::EchoRequest(echo_msg)
    }

    /// Echo Replyメッセージを作成
    pub fn echo_reply(
        identifier: u16,
        sequence_number: u16,
        data: impl AsRef<[u8]>,
        src: impl Into<Ipv6Addr>,
        dst: impl Into<Ipv6Addr>,
    ) -> Self {
        let echo_msg = EchoMessage::new_reply(identifier, sequence_number, data, src, dst);
        ICMPv6Message::EchoReply(echo_msg)
    }

    pub fn message_type(&self) -> ICMPv6MessageType {
        match self {
            ICMPv6Message::DestinationUnreachable(msg) => msg.message_type(),
            ICMPv6Message::TimeExceeded(msg) => msg.message_type(),
            ICMPv6Message::EchoRequest(msg) | ICMPv6Message::EchoReply(msg) => msg.message_type(),
        }
    }

    /// 疑似ヘッダーを使ってチェックサムを検証
    pub fn validate_checksum(&self, src: impl Into<Ipv6Addr>, dst: impl Into<Ipv6Addr>) -> bool {
        match self {
            ICMPv6Message::DestinationUnreachable(msg) => msg.validate_checksum(src, dst),
            ICMPv6Message::TimeExceeded(msg) => msg.validate_checksum(src, dst),
            ICMPv6Message::EchoRequest(msg) | ICMPv6Message::EchoReply(msg) => {
                msg.validate_checksum(src, dst)
            }
        }
    }
}

impl TryFromBytes for ICMPv6Message {
    type Error = ICMPv6Error;

    fn try_from_bytes(value: impl AsRef<[u8]>) -> Result<Self, Self::Error> {
        let bytes = value.as_ref();
        if bytes.len() < 4 {
            return Err(ICMPv6Error::InvalidPacketLength(bytes.len()));
        }

        let message = match ICMPv6MessageType::try_from(bytes[0])? {
            ICMPv6MessageType::DestinationUnreachable => ICMPv6Message::DestinationUnreachable(
                DestinationUnreachableMessage::try_from(bytes)?,
            ),
            ICMPv6MessageType::TimeExceeded => {
                ICMPv6Message::TimeExceeded(TimeExceededMessage::try_from(bytes)?)
            }
            ICMPv6MessageType::EchoRequest => {
                ICMPv6Message::EchoRequest(EchoMessage::try_from(bytes)?)
            }
            ICMPv6MessageType::EchoReply => ICMPv6Message::EchoReply(EchoMessage::try_from(bytes)?),
        };
        Ok(message)
    }
}
impl_try_from_bytes!(ICMPv6Message, ICMPv6Error);

impl From<&ICMPv6Message> for Vec<u8> {
    fn from(value: &ICMPv6Message) -> Self {
        match value {
            ICMPv6Message::DestinationUnreachable(msg) => msg.into(),
            ICMPv6Message::TimeExceeded(msg) => msg.into(),
            ICMPv6Message::EchoRequest(msg) | ICMPv6Message::EchoReply(msg) => msg.into(),
        }
    }
}

impl From<ICMPv6Message> for Vec<u8> {
    fn from(value: ICMPv6Message) -> Self {
        (&value).into()
    }
}
