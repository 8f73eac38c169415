const DF_FLAG_MASK: u8 = 0b0100_0000;
const MF_FLAG_MASK: u8 = 0b0010_0000;

/// IPv4ヘッダーのフラグ
///
/// フラグと断片オフセットを合わせた16ビットの上位バイトで表す
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    /// Don't Fragment
    pub df: bool,

    /// More Fragments
    pub mf: bool,
}

impl From<Flags> for u8 {
    fn from(value: Flags) -> Self {
        let mut flags = 0;
        if value.df {
            flags |= DF_FLAG_MASK;
        }
        if value.mf {
            flags |= MF_FLAG_MASK;
        }
        flags
    }
}

impl From<u8> for Flags {
    fn from(value: u8) -> Self {
        Flags {
            df: (value & DF_FLAG_MASK) != 0,
            mf: (value & MF_FLAG_MASK) != 0,
        }
    }
}
