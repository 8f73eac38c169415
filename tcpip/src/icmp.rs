mod message;
mod message_type;

use thiserror::Error;

pub use self::message::{
    DestinationUnreachableCode, DestinationUnreachableCodeError, DestinationUnreachableMessage,
    DestinationUnreachableMessageError, EchoMessage, EchoMessageError, Message, TimeExceededCode,
    TimeExceededCodeError, TimeExceededMessage, TimeExceededMessageError,
};
pub use self::message_type::{MessageType, MessageTypeError};
use crate::TryFromBytes;

/// ICMPメッセージ処理に関するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ICMPError {
    #[error("Invalid ICMP packet length. Expected at least {0} bytes, but got {1} bytes.")]
    InvalidPacketLength(usize, usize),
    #[error(transparent)]
    InvalidMessageType(#[from] MessageTypeError),
    #[error(transparent)]
    InvalidEchoMessage(#[from] EchoMessageError),
    #[error(transparent)]
    InvalidDestinationUnreachableMessage(#[from] DestinationUnreachableMessageError),
    #[error(transparent)]
    InvalidTimeExceededMessage(#[from] TimeExceededMessageError),
}

/// ICMPメッセージ
///
/// 参照:
/// - [RFC 792 - Internet Control Message Protocol](https://tools.ietf.org/rfc/rfc792.txt)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ICMPMessage {
    EchoReply(EchoMessage),
    DestinationUnreachable(DestinationUnreachableMessage),
    Echo(EchoMessage),
    TimeExceeded(TimeExceededMessage),
}

impl ICMPMessage {
    /// Echo Requestメッセージを作成
    pub fn echo_request(identifier: u16, sequence_number: u16, data: impl AsRef<[u8]>) -> Self {
        ICMPMessage::Echo(EchoMessage::new_request(identifier, sequence_number, data))
    }

    /// Echo Replyメッセージを作成
    pub fn echo_reply(identifier: u16, sequence_number: u16, data: impl AsRef<[u8]>) -> Self {
        ICMPMessage::EchoReply(EchoMessage::new_reply(identifier, sequence_number, data))
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            ICMPMessage::EchoReply(_) => MessageType::EchoReply,
            ICMPMessage::DestinationUnreachable(_) => MessageType::DestinationUnreachable,
            ICMPMessage::Echo(_) => MessageType::Echo,
            ICMPMessage::TimeExceeded(_) => MessageType::TimeExceeded,
        }
    }

    pub fn validate_checksum(&self) -> bool {
        match self {
            ICMPMessage::Echo(echo) | ICMPMessage::EchoReply(echo) => echo.validate_checksum(),
            ICMPMessage::DestinationUnreachable(dest) => dest.validate_checksum(),
            ICMPMessage::TimeExceeded(time) => time.validate_checksum(),
        }
    }
}

impl TryFromBytes for ICMPMessage {
    type Error = ICMPError;

    fn try_from_bytes(value: impl AsRef<[u8]>) -> Result<Self, Self::Error> {
        let bytes = value.as_ref();
        if bytes.len() < 4 {
            return Err(ICMPError::InvalidPacketLength(4, bytes.len()));
        }

        let message = match MessageType::try_from(bytes[0])? {
            MessageType::Echo => ICMPMessage::Echo(EchoMessage::try_from(bytes)?),
            MessageType::EchoReply => ICMPMessage::EchoReply(EchoMessage::try_from(bytes)?),
            MessageType::DestinationUnreachable => {
                ICMPMessage::DestinationUnreachable(DestinationUnreachableMessage::try_from(bytes)?)
            }
            MessageType::TimeExceeded => {
                ICMPMessage::TimeExceeded(TimeExceededMessage::try_from(bytes)?)
            }
        };
        Ok(message)
    }
}
impl_try_from_bytes!(ICMPMessage, ICMPError);

impl From<&ICMPMessage> for Vec<u8> {
    fn from(value: &ICMPMessage) -> Self {
        match value {
            ICMPMessage::Echo(echo) | ICMPMessage::EchoReply(echo) => echo.into(),
            ICMPMessage::DestinationUnreachable(dest) => dest.into(),
            ICMPMessage::TimeExceeded(time) => time.into(),
        }
    }
}

impl From<ICMPMessage> for Vec<u8> {
    fn from(value: ICMPMessage) -> Self {
        (&value).into()
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::ipv4::{Flags, IPv4Packet, Protocol};

    #[test]
    fn test_icmp_message_echo() {
        // [正常系] Echo Request/Replyの生成とパース
        let request = ICMPMessage::echo_request(0x1234, 0x5678, b"ping data");
        assert_eq!(request.message_type(), MessageType::Echo);
        assert!(request.validate_checksum());

        let reply = ICMPMessage::echo_reply(0x1234, 0x5678, b"ping data");
        let bytes: Vec<u8> = (&reply).into();
        let parsed = ICMPMessage::try_from(&bytes).unwrap();
        match parsed {
            ICMPMessage::EchoReply(echo) => {
                assert_eq!(echo.identifier, 0x1234);
                assert_eq!(echo.sequence_number, 0x5678);
                assert_eq!(echo.data.as_ref(), b"ping data");
            }
            msg => panic!("Expected EchoReply message, got {}", msg.message_type()),
        }
    }

    #[test]
    fn test_icmp_message_destination_unreachable() {
        // [正常系] 引用されたEcho Requestを取り出せる
        let echo: Vec<u8> = EchoMessage::new_request(0x0101, 9, [0u8; 16]).into();
        let datagram = IPv4Packet::new(
            0,
            1,
            Flags::default(),
            0,
            64,
            Protocol::ICMP,
            Ipv4Addr::new(192, 168, 0, 2),
            Ipv4Addr::new(192, 168, 0, 99),
            [],
            echo,
        );
        let msg = DestinationUnreachableMessage::new(
            DestinationUnreachableCode::HostUnreachable,
            None,
            datagram,
        )
        .unwrap();
        let bytes: Vec<u8> = msg.into();

        let ICMPMessage::DestinationUnreachable(parsed) = ICMPMessage::try_from(bytes).unwrap()
        else {
            panic!("Expected DestinationUnreachable message");
        };
        let ICMPMessage::Echo(quoted) =
            ICMPMessage::try_from(&parsed.original_datagram.payload).unwrap()
        else {
            panic!("Expected quoted Echo Request");
        };
        assert_eq!(quoted.identifier, 0x0101);
        assert_eq!(quoted.sequence_number, 9);
    }

    #[test]
    fn test_icmp_message_try_from_bytes_error() {
        // [異常系] 短すぎるデータ
        assert_eq!(
            ICMPMessage::try_from(&[0x00u8, 0x00][..]).unwrap_err(),
            ICMPError::InvalidPacketLength(4, 2)
        );

        // [異常系] 扱わないタイプ (Redirect)
        assert!(matches!(
            ICMPMessage::try_from(&[0x05u8, 0x00, 0x00, 0x00][..]).unwrap_err(),
            ICMPError::InvalidMessageType(_)
        ));
    }
}
