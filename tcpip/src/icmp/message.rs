pub mod destination_unreachable;
pub mod echo;
pub mod time_exceeded;

pub use self::destination_unreachable::{
    DestinationUnreachableCode, DestinationUnreachableCodeError, DestinationUnreachableMessage,
    DestinationUnreachableMessageError,
};
pub use self::echo::{EchoMessage, EchoMessageError};
pub use self::time_exceeded::{
    TimeExceededCode, TimeExceededCodeError, TimeExceededMessage, TimeExceededMessageError,
};
use crate::checksum::calculate_internet_checksum;

/// ICMPメッセージの共通インターフェース
pub trait Message
where
    Vec<u8>: for<'a> From<&'a Self>,
{
    /// メッセージタイプを取得
    fn msg_type(&self) -> u8;

    /// メッセージコードを取得
    fn code(&self) -> u8;

    /// メッセージ全体の長さを取得
    fn total_length(&self) -> usize;

    /// チェックサムを計算
    ///
    /// チェックサムフィールドが0の状態で呼ぶと送信用の値になる
    fn calculate_checksum(&self) -> u16 {
        let data = Vec::<u8>::from(self);
        calculate_internet_checksum(&data)
    }

    /// チェックサムを検証
    fn validate_checksum(&self) -> bool {
        self.calculate_checksum() == 0
    }
}
