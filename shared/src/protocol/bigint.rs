//! Minimal two's-complement integer bytes
//!
//! Produces the little-endian byte string the unpickler expects after a
//! `LONG1`/`LONG4` opcode: the shortest sequence whose top bit carries the
//! sign and which decodes back to exactly the same value. Zero is the empty
//! string.

/// Encode `x` as minimal little-endian two's complement.
pub fn encode_long(x: i64) -> Vec<u8> {
    if x == 0 {
        return Vec::new();
    }

    // ceil((bitlength(|x|) + 1) / 8); |i64::MIN| has 64 bits and needs 9 bytes
    // before trimming.
    let bits = u64::BITS - x.unsigned_abs().leading_zeros();
    let nbytes = (bits / 8 + 1) as usize;

    let wide = i128::from(x).to_le_bytes();
    let mut out = wide[..nbytes].to_vec();

    // -2^(8k-1) gets one byte too many from the formula above.
    if x < 0 && nbytes > 1 && out[nbytes - 1] == 0xFF && out[nbytes - 2] & 0x80 != 0 {
        out.pop();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> i64 {
        if bytes.is_empty() {
            return 0;
        }
        let fill = if bytes[bytes.len() - 1] & 0x80 != 0 { 0xFF } else { 0x00 };
        let mut wide = [fill; 16];
        wide[..bytes.len()].copy_from_slice(bytes);
        i128::from_le_bytes(wide) as i64
    }

    #[test]
    fn test_zero_is_empty() {
        assert!(encode_long(0).is_empty());
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(encode_long(255), [0xFF, 0x00]);
        assert_eq!(encode_long(32767), [0xFF, 0x7F]);
        assert_eq!(encode_long(-256), [0x00, 0xFF]);
        assert_eq!(encode_long(-32768), [0x00, 0x80]);
        assert_eq!(encode_long(-128), [0x80]);
        assert_eq!(encode_long(127), [0x7F]);
        assert_eq!(encode_long(128), [0x80, 0x00]);
        assert_eq!(encode_long(-1), [0xFF]);
    }

    #[test]
    fn test_five_byte_values() {
        assert_eq!(encode_long(424_242_424_242), [0xB2, 0xA9, 0xD1, 0xC6, 0x62]);
        assert_eq!(encode_long(-424_242_424_242), [0x4E, 0x56, 0x2E, 0x39, 0x9D]);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(
            encode_long(i64::MAX),
            [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F]
        );
        assert_eq!(
            encode_long(i64::MIN),
            [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80]
        );
    }

    #[test]
    fn test_sign_bit_matches_value() {
        for x in [
            1_i64,
            -2,
            129,
            -129,
            1 << 31,
            -(1 << 31) - 1,
            1 << 40,
            -(1 << 40),
            (1 << 55) - 1,
            -(1 << 55),
        ] {
            let bytes = encode_long(x);
            let top = bytes[bytes.len() - 1];
            assert_eq!(top & 0x80 != 0, x < 0, "sign bit for {x}");
            assert_eq!(decode(&bytes), x, "decode of {x}");
        }
    }

    #[test]
    fn test_no_redundant_leading_byte() {
        for x in [-(1_i64 << 15), -(1 << 23), -(1 << 31), -(1 << 39), 1 << 39] {
            let bytes = encode_long(x);
            assert_ne!(decode(&bytes[..bytes.len() - 1]), x, "{x} is not minimal");
        }
    }
}
