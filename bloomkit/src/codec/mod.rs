// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Byte-level helpers for the compact binary encoding.

/// Bits of a filter packed 8 per byte, most significant bit first.
///
/// Bit `i` lives in `bytes[i / 8]` under mask `0x80 >> (i % 8)`; trailing bits of the
/// last byte past the filter size are zero.
pub(crate) mod packed {
    /// Number of bytes needed to hold `num_bits` packed bits.
    pub(crate) fn byte_len(num_bits: u64) -> usize {
        num_bits.div_ceil(8) as usize
    }

    /// Packs the first `num_bits` bits of LSB-first `words` into MSB-first bytes.
    pub(crate) fn pack(words: &[u64], num_bits: u64) -> Vec<u8> {
        let mut bytes = vec![0u8; byte_len(num_bits)];
        for (word_index, &word) in words.iter().enumerate() {
            let mut remaining = word;
            while remaining != 0 {
                let bit = remaining.trailing_zeros() as u64;
                remaining &= remaining - 1;
                let index = ((word_index as u64) << 6) | bit;
                if index < num_bits {
                    bytes[(index >> 3) as usize] |= 0x80 >> (index & 7);
                }
            }
        }
        bytes
    }

    /// Unpacks MSB-first `bytes` into LSB-first words, keeping exactly `num_bits` bits.
    ///
    /// Padding bits past `num_bits` are discarded. `bytes` may be shorter than
    /// [`byte_len`], in which case the missing bits are zero.
    pub(crate) fn unpack(bytes: &[u8], num_bits: u64) -> Vec<u64> {
        let mut words = vec![0u64; num_bits.div_ceil(64) as usize];
        for (byte_index, &byte) in bytes.iter().enumerate() {
            for offset in 0..8u64 {
                if byte & (0x80 >> offset) == 0 {
                    continue;
                }
                let index = ((byte_index as u64) << 3) | offset;
                if index < num_bits {
                    words[(index >> 6) as usize] |= 1u64 << (index & 63);
                }
            }
        }
        words
    }
}

/// A simple wrapper around a `Vec<u8>` that provides methods for writing various types of data.
pub(crate) struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    /// Constructs an empty `ByteWriter` with at least the specified capacity.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Consumes the `ByteWriter` and returns the underlying `Vec<u8>`.
    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Writes the given byte slice.
    pub(crate) fn write(&mut self, buf: &[u8]) {
        self.bytes.extend_from_slice(buf);
    }

    /// Writes a single byte.
    pub(crate) fn write_u8(&mut self, n: u8) {
        self.bytes.push(n);
    }

    /// Writes a 32-bit unsigned integer in little-endian byte order.
    pub(crate) fn write_u32_le(&mut self, n: u32) {
        self.write(&n.to_le_bytes());
    }

    /// Writes a 64-bit unsigned integer in little-endian byte order.
    pub(crate) fn write_u64_le(&mut self, n: u64) {
        self.write(&n.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::packed;
    use super::ByteWriter;

    #[test]
    fn test_pack_is_msb_first() {
        // bits 0 and 9 set
        let words = [1u64 | (1u64 << 9)];
        assert_eq!(packed::pack(&words, 10), vec![0b1000_0000, 0b0100_0000]);
    }

    #[test]
    fn test_unpack_discards_padding() {
        // 10 bits; the low 6 bits of the second byte are padding
        let words = packed::unpack(&[0xFF, 0xFF], 10);
        assert_eq!(words, vec![0b11_1111_1111]);
    }

    #[test]
    fn test_byte_len() {
        assert_eq!(packed::byte_len(1), 1);
        assert_eq!(packed::byte_len(8), 1);
        assert_eq!(packed::byte_len(9), 2);
    }

    #[test]
    fn test_writer_little_endian() {
        let mut writer = ByteWriter::with_capacity(13);
        writer.write_u8(7);
        writer.write_u32_le(0x0102_0304);
        writer.write_u64_le(1);
        assert_eq!(
            writer.into_bytes(),
            vec![7, 4, 3, 2, 1, 1, 0, 0, 0, 0, 0, 0, 0]
        );
    }
}
