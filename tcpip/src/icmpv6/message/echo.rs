use std::net::Ipv6Addr;

use bytes::Bytes;
use thiserror::Error;

use crate::icmpv6::message::Message;
use crate::icmpv6::message_type::ICMPv6MessageType;
use crate::TryFromBytes;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EchoMessageError {
    #[error("Invalid echo message type. Expected 128 or 129, but got {0}.")]
    InvalidMessageType(u8),
    #[error("Invalid echo message length. Expected at least 8 bytes, but got {0} bytes.")]
    InvalidMessageLength(usize),
}

/// ICMPv6 Echo Request/Reply メッセージ
///
/// RFC 4443で定義されたEcho Request (Type 128) とEcho Reply (Type 129)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoMessage {
    /// Echo RequestかEcho Replyかを示すフラグ
    pub is_reply: bool,

    /// Checksum
    pub checksum: u16,

    /// Identifier
    pub identifier: u16,

    /// Sequence Number
    pub sequence_number: u16,

    /// Data
    pub data: Bytes,
}

impl EchoMessage {
    /// 新しいEcho Requestメッセージを作成
    ///
    /// 送信元が未確定(`Ipv6Addr::UNSPECIFIED`)の場合、ソケット経由の送信時にカーネルがチェックサムを書き換える
    pub fn new_request(
        identifier: u16,
        sequence_number: u16,
        data: impl AsRef<[u8]>,
        src: impl Into<Ipv6Addr>,
        dst: impl Into<Ipv6Addr>,
    ) -> Self {
        Self::new(false, identifier, sequence_number, data, src, dst)
    }

    /// 新しいEcho Replyメッセージを作成
    pub fn new_reply(
        identifier: u16,
        sequence_number: u16,
        data: impl AsRef<[u8]>,
        src: impl Into<Ipv6Addr>,
        dst: impl Into<Ipv6Addr>,
    ) -> Self {
        Self::new(true, identifier, sequence_number, data, src, dst)
    }

    fn new(
        is_reply: bool,
        identifier: u16,
        sequence_number: u16,
        data: impl AsRef<[u8]>,
        src: impl Into<Ipv6Addr>,
        dst: impl Into<Ipv6Addr>,
    ) -> Self {
        let mut msg = EchoMessage {
            is_reply,
            checksum: 0, // チェックサムは後で計算する
            identifier,
            sequence_number,
            data: Bytes::copy_from_slice(data.as_ref()),
        };
        msg.checksum = msg.calculate_checksum(src, dst);
        msg
    }
}

impl TryFromBytes for EchoMessage {
    type Error = EchoMessageError;

    fn try_from_bytes(value: impl AsRef<[u8]>) -> Result<Self, Self::Error> {
        let bytes = value.as_ref();
        if bytes.len() < 8 {
            return Err(EchoMessageError::InvalidMessageLength(bytes.len()));
        }

        let is_reply = match bytes[0] {
            128 => false,
            129 => true,
            msg_type => return Err(EchoMessageError::InvalidMessageType(msg_type)),
        };

        Ok(EchoMessage {
            is_reply,
            checksum: u16::from_be_bytes([bytes[2], bytes[3]]),
            identifier: u16::from_be_bytes([bytes[4], bytes[5]]),
            sequence_number: u16::from_be_bytes([bytes[6], bytes[7]]),
            data: Bytes::copy_from_slice(&bytes[8..]),
        })
    }
}
impl_try_from_bytes!(EchoMessage, EchoMessageError);

impl Message for EchoMessage {
    fn message_type(&self) -> ICMPv6MessageType {
        match self.is_reply {
            true => ICMPv6MessageType::EchoReply,
            false => ICMPv6MessageType::EchoRequest,
        }
    }

    fn code(&self) -> u8 {
        0
    }

    fn total_length(&self) -> usize {
        8 + self.data.len()
    }
}

impl From<&EchoMessage> for Vec<u8> {
    fn from(value: &EchoMessage) -> Self {
        let mut bytes = Vec::with_capacity(value.total_length());
        bytes.push(value.message_type().into());
        bytes.push(value.code());
        bytes.extend_from_slice(&value.checksum.to_be_bytes());
        bytes.extend_from_slice(&value.identifier.to_be_bytes());
        bytes.extend_from_slice(&value.sequence_number.to_be_bytes());
        bytes.extend_from_slice(&value.data);
        bytes
    }
}

impl From<EchoMessage> for Vec<u8> {
    fn from(value: EchoMessage) -> Self {
        (&value).into()
    }
}
