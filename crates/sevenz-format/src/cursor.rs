//! Sequential reader over an immutable byte buffer

use binrw::Endian;

use crate::error::{FormatError, FormatResult};

/// Sequential reader with a monotonically advancing position.
///
/// There is no implicit rewind; callers seeking backward must capture the
/// position with [`ByteCursor::position`] and restore it with
/// [`ByteCursor::set_position`].
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at the start of `buf`
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, position: 0 }
    }

    /// Current position in the buffer
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Restore a previously captured position
    pub const fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Whether the position has reached the end of the buffer
    pub const fn at_end(&self) -> bool {
        self.position == self.buf.len()
    }

    /// Bytes remaining past the current position
    pub const fn remaining(&self) -> usize {
        self.buf.len() - self.position
    }

    /// Look at the next byte without advancing
    pub fn peek(&self) -> Option<u8> {
        self.buf.get(self.position).copied()
    }

    /// Read the next `count` bytes, advancing the position
    pub fn read(&mut self, count: usize) -> FormatResult<&'a [u8]> {
        let out_of_bounds = FormatError::OutOfBounds {
            position: self.position,
            requested: count,
            length: self.buf.len(),
        };
        let end = self.position.checked_add(count).ok_or(out_of_bounds.clone())?;
        if end > self.buf.len() {
            return Err(out_of_bounds);
        }
        let bytes = &self.buf[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> FormatResult<u8> {
        Ok(self.read(1)?[0])
    }

    /// Read one byte as a boolean; nonzero maps to true
    pub fn read_bool(&mut self) -> FormatResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read `width` (1-8) bytes as an unsigned integer in the given byte
    /// order, zero-padding the missing high-order bytes
    pub fn read_int(&mut self, width: usize, endian: Endian) -> FormatResult<u64> {
        if !(1..=8).contains(&width) {
            return Err(FormatError::InvalidWidth(width));
        }
        let bytes = self.read(width)?;
        let mut value = 0u64;
        match endian {
            Endian::Big => {
                for &byte in bytes {
                    value = (value << 8) | u64::from(byte);
                }
            }
            Endian::Little => {
                for &byte in bytes.iter().rev() {
                    value = (value << 8) | u64::from(byte);
                }
            }
        }
        Ok(value)
    }

    /// Decode the format's native packed number.
    ///
    /// The leading-ones count `k` of the first byte selects `k` little-endian
    /// extension bytes; the first byte's low `7 - k` bits become the value's
    /// high-order bits. With `k == 8` the value is the next 8 bytes as a
    /// little-endian 64-bit integer and the first byte contributes no bits.
    pub fn read_number(&mut self) -> FormatResult<u64> {
        let first = self.read_u8()?;
        let ones = first.leading_ones() as usize;
        if ones == 8 {
            let bytes = self.read(8)?;
            let mut raw = [0u8; 8];
            raw.copy_from_slice(bytes);
            return Ok(u64::from_le_bytes(raw));
        }
        let mut low = 0u64;
        for (i, &byte) in self.read(ones)?.iter().enumerate() {
            low |= u64::from(byte) << (8 * i);
        }
        let high = u64::from(first & (0x7F >> ones));
        Ok(low | (high << (8 * ones)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn read_advances_and_bounds_checks() {
        let mut cursor = ByteCursor::new(&[1, 2, 3]);
        assert_eq!(cursor.read(2).unwrap(), &[1, 2]);
        assert_eq!(cursor.position(), 2);
        assert!(!cursor.at_end());
        assert!(matches!(
            cursor.read(2),
            Err(FormatError::OutOfBounds {
                position: 2,
                requested: 2,
                length: 3
            })
        ));
        // a failed read does not advance
        assert_eq!(cursor.read(1).unwrap(), &[3]);
        assert!(cursor.at_end());
    }

    #[test]
    fn read_int_both_endiannesses() {
        let data = [0x12, 0x34, 0x56];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_int(3, Endian::Big).unwrap(), 0x0012_3456);
        cursor.set_position(0);
        assert_eq!(cursor.read_int(3, Endian::Little).unwrap(), 0x0056_3412);
    }

    #[test]
    fn read_int_rejects_illegal_widths() {
        let mut cursor = ByteCursor::new(&[0; 16]);
        assert!(matches!(cursor.read_int(0, Endian::Big), Err(FormatError::InvalidWidth(0))));
        assert!(matches!(cursor.read_int(9, Endian::Big), Err(FormatError::InvalidWidth(9))));
        // width errors are raised before any bytes are consumed
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn read_bool_maps_nonzero_to_true() {
        let mut cursor = ByteCursor::new(&[0, 1, 0x7F]);
        assert!(!cursor.read_bool().unwrap());
        assert!(cursor.read_bool().unwrap());
        assert!(cursor.read_bool().unwrap());
    }

    #[test]
    fn packed_number_single_byte() {
        // k = 0: value is the low 7 bits of the first byte
        let mut cursor = ByteCursor::new(&[0x27]);
        assert_eq!(cursor.read_number().unwrap(), 0x27);
        assert!(cursor.at_end());
    }

    #[test]
    fn packed_number_one_extension_byte() {
        // k = 1: first byte 0b1000_0011 contributes 6 high bits (0b000011),
        // one little-endian extension byte supplies the low 8
        let mut cursor = ByteCursor::new(&[0x83, 0xFF]);
        assert_eq!(cursor.read_number().unwrap(), (0x03 << 8) | 0xFF);
    }

    #[test]
    fn packed_number_two_extension_bytes() {
        // k = 2: high bits are the low 5 bits of the first byte
        let mut cursor = ByteCursor::new(&[0xC5, 0x34, 0x12]);
        assert_eq!(cursor.read_number().unwrap(), (0x05 << 16) | 0x1234);
    }

    #[test]
    fn packed_number_seven_extension_bytes() {
        // k = 7: the first byte contributes no value bits
        let mut data = vec![0xFE];
        data.extend_from_slice(&[0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77]);
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_number().unwrap(), 0x0077_6655_4433_2211);
    }

    #[test]
    fn packed_number_full_width() {
        // k = 8: exactly 8 trailing bytes as a little-endian 64-bit value
        let mut data = vec![0xFF];
        data.extend_from_slice(&u64::MAX.to_le_bytes());
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_number().unwrap(), u64::MAX);
        assert!(cursor.at_end());
    }

    #[test]
    fn packed_number_truncated_extension_fails() {
        let mut cursor = ByteCursor::new(&[0xC1, 0x00]);
        assert!(matches!(cursor.read_number(), Err(FormatError::OutOfBounds { .. })));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;
        use proptest::test_runner::TestCaseError;

        /// Assemble the documented bit layout for a given leading-ones count
        fn encode(k: usize, high: u8, ext: &[u8]) -> Vec<u8> {
            let pattern = ((0xFFu16 << (8 - k)) & 0xFF) as u8;
            let mut bytes = vec![pattern | high];
            bytes.extend_from_slice(ext);
            bytes
        }

        fn packed_case() -> impl Strategy<Value = (Vec<u8>, u64)> {
            (0usize..=8).prop_flat_map(|k| {
                if k == 8 {
                    (any::<u64>())
                        .prop_map(|value| {
                            let mut bytes = vec![0xFF];
                            bytes.extend_from_slice(&value.to_le_bytes());
                            (bytes, value)
                        })
                        .boxed()
                } else {
                    let high_bits = 7 - k;
                    let high_max = if high_bits == 0 { 0 } else { (1u8 << high_bits) - 1 };
                    (0..=high_max, prop::collection::vec(any::<u8>(), k))
                        .prop_map(move |(high, ext)| {
                            let mut low = 0u64;
                            for (i, &byte) in ext.iter().enumerate() {
                                low |= u64::from(byte) << (8 * i);
                            }
                            let value = low | (u64::from(high) << (8 * k));
                            (encode(k, high, &ext), value)
                        })
                        .boxed()
                }
            })
        }

        proptest! {
            /// Decoding matches the documented bit layout for every
            /// leading-ones count
            #[test]
            fn packed_number_matches_manual_assembly((bytes, expected) in packed_case()) {
                let mut cursor = ByteCursor::new(&bytes);
                prop_assert_eq!(cursor.read_number().map_err(|e| TestCaseError::fail(e.to_string()))?, expected);
                prop_assert!(cursor.at_end());
            }
        }
    }
}
