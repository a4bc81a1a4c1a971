//! CRC-32 (IEEE 802.3, reflected polynomial 0xEDB88320) as used by zlib

use crc32fast::Hasher;

/// CRC-32 of `data`, identical to `zlib.crc32(data) & 0xFFFFFFFF`.
pub fn calculate_crc32(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(calculate_crc32(b""), 0);
        assert_eq!(calculate_crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(
            calculate_crc32(b"The quick brown fox jumps over the lazy dog"),
            0x414F_A339
        );
    }

    #[test]
    fn test_single_bit_change() {
        let a = [0u8; 64];
        let mut b = a;
        b[31] = 0x01;
        assert_ne!(calculate_crc32(&a), calculate_crc32(&b));
    }
}
