trait TryFromBytes {
    type Error;

    fn try_from_bytes(value: impl AsRef<[u8]>) -> Result<Self, Self::Error>
    where
        Self: Sized;
}

/// `TryFromBytes`を実装した型に対してバイト列系の`TryFrom`をまとめて実装する
macro_rules! impl_try_from_bytes {
    ($ty:ty, $err:ty) => {
        impl TryFrom<&[u8]> for $ty {
            type Error = $err;

            fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
                <$ty as $crate::TryFromBytes>::try_from_bytes(value)
            }
        }

        impl TryFrom<&Vec<u8>> for $ty {
            type Error = $err;

            fn try_from(value: &Vec<u8>) -> Result<Self, Self::Error> {
                <$ty as $crate::TryFromBytes>::try_from_bytes(value)
            }
        }

        impl TryFrom<Vec<u8>> for $ty {
            type Error = $err;

            fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
                <$ty as $crate::TryFromBytes>::try_from_bytes(value)
            }
        }

        impl TryFrom<&bytes::Bytes> for $ty {
            type Error = $err;

            fn try_from(value: &bytes::Bytes) -> Result<Self, Self::Error> {
                <$ty as $crate::TryFromBytes>::try_from_bytes(value)
            }
        }
    };
}

pub mod checksum;
pub mod icmp;
pub mod icmpv6;
pub mod ipv4;
pub mod ipv6;
