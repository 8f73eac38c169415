//! Internet Checksum 計算モジュール
//!
//! RFC 1071に準拠したInternet Checksumの実装
//! IPv4ヘッダー、ICMP、ICMPv6(疑似ヘッダー込み)のチェックサムで使用される

use std::net::Ipv6Addr;

/// Internet Checksumを計算
///
/// # Example
/// ```
/// use tcpip::checksum::calculate_internet_checksum;
///
/// let data = vec![0x45, 0x00, 0x00, 0x3c];
/// let checksum = calculate_internet_checksum(&data);
/// ```
pub fn calculate_internet_checksum(data: &[u8]) -> u16 {
    !fold(sum_words(0, data))
}

/// ICMPv6用の疑似ヘッダーを含めたチェックサムを計算
///
/// RFC 8200 Section 8.1 の疑似ヘッダー(送信元、宛先、上位層の長さ、Next Header)を前置する
pub fn calculate_pseudo_header_checksum(
    src: &Ipv6Addr,
    dst: &Ipv6Addr,
    next_header: u8,
    data: &[u8],
) -> u16 {
    let mut sum = sum_words(0, &src.octets());
    sum = sum_words(sum, &dst.octets());
    sum = sum_words(sum, &(data.len() as u32).to_be_bytes());
    sum = sum_words(sum, &[0, 0, 0, next_header]);
    sum = sum_words(sum, data);
    !fold(sum)
}

fn sum_words(mut sum: u32, data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        sum = sum.wrapping_add(u16::from_be_bytes([chunk[0], chunk[1]]) as u32);
    }

    // 奇数バイトが残っている場合は下位を0で埋める
    if let [last] = chunks.remainder() {
        sum = sum.wrapping_add(u16::from_be_bytes([*last, 0]) as u32);
    }
    sum
}

/// キャリーを畳み込む
fn fold(mut sum: u32) -> u16 {
    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_internet_checksum() {
        // [正常系] RFC 1071の例 (0001 f203 f4f5 f6f7 -> 合計 ddf2 -> 補数 220d)
        let data = [0x00, 0x01, 0xf2, 0x03, 0xf4, 0xf5, 0xf6, 0xf7];
        assert_eq!(calculate_internet_checksum(&data), 0x220d);

        // [正常系] 奇数バイトのデータ
        let data = [0xFF];
        assert_eq!(calculate_internet_checksum(&data), 0x00FF);

        // [正常系] 空データ
        assert_eq!(calculate_internet_checksum(&[]), 0xFFFF);
    }

    #[test]
    fn test_checksum_verification() {
        // [正常系] チェックサムを含むデータのチェックサムは0になる
        let mut data = vec![0x08, 0x00, 0x00, 0x00, 0x12, 0x34, 0x56, 0x78];
        let checksum = calculate_internet_checksum(&data);
        data[2..4].copy_from_slice(&checksum.to_be_bytes());
        assert_eq!(calculate_internet_checksum(&data), 0);
    }

    #[test]
    fn test_calculate_pseudo_header_checksum() {
        // [正常系] 疑似ヘッダー込みで検証すると0になる
        let src = Ipv6Addr::LOCALHOST;
        let dst = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1);
        let mut data = vec![0x80, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0xAB];
        let checksum = calculate_pseudo_header_checksum(&src, &dst, 58, &data);
        data[2..4].copy_from_slice(&checksum.to_be_bytes());
        assert_eq!(calculate_pseudo_header_checksum(&src, &dst, 58, &data), 0);

        // [正常系] 宛先が異なると検証に失敗する
        assert_ne!(
            calculate_pseudo_header_checksum(&src, &Ipv6Addr::LOCALHOST, 58, &data),
            0
        );
    }
}
