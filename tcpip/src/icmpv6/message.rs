pub mod destination_unreachable;
pub mod echo;
pub mod time_exceeded;

use std::net::Ipv6Addr;

pub use self::destination_unreachable::{
    DestinationUnreachableCode, DestinationUnreachableCodeError, DestinationUnreachableMessage,
    DestinationUnreachableMessageError,
};
pub use self::echo::{EchoMessage, EchoMessageError};
pub use self::time_exceeded::{
    TimeExceededCode, TimeExceededCodeError, TimeExceededMessage, TimeExceededMessageError,
};
use crate::checksum::calculate_pseudo_header_checksum;
use crate::icmpv6::ICMPv6MessageType;
use crate::ipv4::Protocol;

/// ICMPv6メッセージの共通トレイト
pub trait Message
where
    Vec<u8>: for<'a> From<&'a Self>,
{
    /// メッセージのタイプを取得
    fn message_type(&self) -> ICMPv6MessageType;

    /// メッセージのコードを取得
    fn code(&self) -> u8;

    /// メッセージの全長を取得
    fn total_length(&self) -> usize;

    /// 疑似IPv6ヘッダーを含めたチェックサムを計算
    fn calculate_checksum(&self, src: impl Into<Ipv6Addr>, dst: impl Into<Ipv6Addr>) -> u16 {
        let data = Vec::<u8>::from(self);
        calculate_pseudo_header_checksum(
            &src.into(),
            &dst.into(),
            Protocol::IPv6ICMP.into(),
            &data,
        )
    }

    /// チェックサムを検証
    fn validate_checksum(&self, src: impl Into<Ipv6Addr>, dst: impl Into<Ipv6Addr>) -> bool {
        self.calculate_checksum(src, dst) == 0
    }
}
