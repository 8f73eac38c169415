use bytes::Bytes;
use thiserror::Error;

use crate::icmp::MessageType;
use crate::icmp::message::Message;
use crate::TryFromBytes;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EchoMessageError {
    #[error("Invalid echo message type. Expected 8 or 0, but got {0}.")]
    InvalidMessageType(u8),
    #[error("Invalid echo message length. Expected at least 8 bytes, but got {0} bytes.")]
    InvalidMessageLength(usize),
}

/// Echo Request/Reply メッセージ
///
/// RFC 792で定義されたEcho Request (Type 8) とEcho Reply (Type 0)
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
    /// pingのパケットサイズはこの部分の長さ
    pub data: Bytes,
}

impl EchoMessage {
    pub fn new(
        is_reply: bool,
        identifier: u16,
        sequence_number: u16,
        data: impl AsRef<[u8]>,
    ) -> Self {
        let mut msg = EchoMessage {
            is_reply,
            checksum: 0, // チェックサムは後で計算する
            identifier,
            sequence_number,
            data: Bytes::copy_from_slice(data.as_ref()),
        };
        msg.checksum = msg.calculate_checksum();
        msg
    }

    pub fn new_request(identifier: u16, sequence_number: u16, data: impl AsRef<[u8]>) -> Self {
        Self::new(false, identifier, sequence_number, data)
    }

    pub fn new_reply(identifier: u16, sequence_number: u16, data: impl AsRef<[u8]>) -> Self {
        Self::new(true, identifier, sequence_number, data)
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
            0 => true,
            8 => false,
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
    fn msg_type(&self) -> u8 {
        match self.is_reply {
            true => MessageType::EchoReply.into(),
            false => MessageType::Echo.into(),
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

        bytes.push(value.msg_type());
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_message_new_request() {
        // [正常系] RFC 792の形式でシリアライズされる
        let echo = EchoMessage::new_request(0x1234, 0x5678, b"Hello");
        let bytes: Vec<u8> = (&echo).into();
        assert_eq!(
            bytes,
            [
                0x08, 0x00, // Type: Echo Request, Code: 0
                0x6B, 0x81, // Checksum
                0x12, 0x34, // Identifier
                0x56, 0x78, // Sequence Number
                0x48, 0x65, 0x6C, 0x6C, 0x6F, // "Hello"
            ]
        );
        assert!(echo.validate_checksum());
        assert_eq!(echo.total_length(), 13);

        // [正常系] データ部の長さはそのまま保持される
        let echo = EchoMessage::new_request(1, 1, vec![0xA5; 1400]);
        assert_eq!(echo.data.len(), 1400);
        assert!(echo.validate_checksum());
    }

    #[test]
    fn test_echo_message_try_from_bytes() {
        // [正常系] Echo Replyのパース
        let reply = EchoMessage::new_reply(0xABCD, 0x0001, b"pong");
        let bytes: Vec<u8> = reply.clone().into();
        let parsed = EchoMessage::try_from(&bytes).unwrap();
        assert_eq!(parsed, reply);
        assert!(parsed.is_reply);
        assert!(parsed.validate_checksum());

        // [異常系] 8バイト未満
        assert_eq!(
            EchoMessage::try_from(&bytes[..7]).unwrap_err(),
            EchoMessageError::InvalidMessageLength(7)
        );

        // [異常系] Echo以外のタイプ
        let mut invalid = bytes.clone();
        invalid[0] = 0x03;
        assert_eq!(
            EchoMessage::try_from(invalid).unwrap_err(),
            EchoMessageError::InvalidMessageType(3)
        );

        // [異常系] 改ざんされたデータはチェックサム検証に失敗する
        let mut tampered = bytes;
        tampered[9] ^= 0xFF;
        assert!(!EchoMessage::try_from(tampered).unwrap().validate_checksum());
    }
}
