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

//! Persisted forms of a [`BloomFilter`].
//!
//! Two encodings are supported:
//!
//! - A JSON document ([`FilterDocument`]) written by [`BloomFilter::save`] and read by
//!   [`BloomFilter::load`]. The bit array is packed 8 bits per byte, most significant bit
//!   first, and stored as a list of integers next to a human-readable metadata summary.
//! - A compact little-endian binary encoding produced by [`BloomFilter::serialize`].
//!
//! Both reproduce the filter bit-for-bit, trimmed to exactly `size` bits.

use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Cursor;
use std::io::Write;
use std::path::Path;

use byteorder::ReadBytesExt;
use byteorder::LE;
use serde::Deserialize;
use serde::Serialize;

use super::BloomFilter;
use crate::codec::packed;
use crate::codec::ByteWriter;
use crate::error::Error;

// Binary serialization constants
const SERIAL_VERSION: u8 = 1;
const BLOOM_FORMAT_ID: u8 = 0xB1;
const EMPTY_FLAG_MASK: u8 = 1 << 0;
const HEADER_BYTES: usize = 16;

/// The JSON document written by [`BloomFilter::save`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDocument {
    /// Bit-array length.
    pub size: u64,
    /// Probe count.
    pub hash_num: u32,
    /// Packed bits, MSB-first, zero-padded to a byte boundary.
    pub bit_array: Vec<u8>,
    /// Summary for human inspection.
    pub metadata: DocumentMetadata,
}

/// Advisory summary stored alongside the bits. Not re-validated on load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Count of 1-bits at save time.
    pub bits_set: u64,
    /// `bits_set / size`, rounded to 4 decimal places.
    pub fill_ratio: f64,
}

impl BloomFilter {
    /// Converts the filter into its persisted document form.
    pub fn to_document(&self) -> FilterDocument {
        FilterDocument {
            size: self.size,
            hash_num: self.hash_num,
            bit_array: packed::pack(&self.words, self.size),
            metadata: DocumentMetadata {
                bits_set: self.bits_set,
                fill_ratio: (self.fill_ratio() * 10_000.0).round() / 10_000.0,
            },
        }
    }

    /// Reconstructs a filter from a persisted document.
    ///
    /// The packed bits are truncated to exactly `size` bits. `metadata` is ignored; the
    /// set-bit count is recomputed from the bits themselves.
    ///
    /// # Errors
    ///
    /// Returns [`IoFailure`](crate::error::ErrorKind::IoFailure) if the declared shape is
    /// zero or the packed array does not hold exactly `ceil(size / 8)` bytes.
    pub fn from_document(doc: &FilterDocument) -> Result<Self, Error> {
        Self::from_packed(doc.size, doc.hash_num, &doc.bit_array)
    }

    /// Renders the filter as a JSON document string.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_document()).map_err(Error::json)
    }

    /// Parses a filter from a JSON document string.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let doc: FilterDocument = serde_json::from_str(json).map_err(Error::json)?;
        Self::from_document(&doc)
    }

    /// Writes the filter to `path` as a JSON document, replacing any existing file.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let dir = tempfile::tempdir().unwrap();
    /// let path = dir.path().join("words.bloom.json");
    ///
    /// let mut filter = BloomFilter::new(500, 2).unwrap();
    /// filter.insert("abruptly");
    /// filter.save(&path).unwrap();
    ///
    /// let restored = BloomFilter::load(&path).unwrap();
    /// assert_eq!(filter, restored);
    /// ```
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|err| Error::io(path, err))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &self.to_document())
            .map_err(|err| Error::json(err).with_context("path", path.display()))?;
        writer.flush().map_err(|err| Error::io(path, err))?;

        tracing::debug!(
            path = %path.display(),
            size = self.size,
            hash_num = self.hash_num,
            bits_set = self.bits_set,
            "saved bloom filter"
        );
        Ok(())
    }

    /// Reads a filter previously written by [`save()`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns [`IoFailure`](crate::error::ErrorKind::IoFailure) if the file cannot be
    /// read, is not a valid document, or its bit array does not match its size.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| Error::io(path, err))?;
        let doc: FilterDocument = serde_json::from_reader(BufReader::new(file))
            .map_err(|err| Error::json(err).with_context("path", path.display()))?;
        let filter =
            Self::from_document(&doc).map_err(|err| err.with_context("path", path.display()))?;

        tracing::debug!(
            path = %path.display(),
            size = filter.size,
            hash_num = filter.hash_num,
            bits_set = filter.bits_set,
            "loaded bloom filter"
        );
        Ok(filter)
    }

    /// Serializes the filter to a compact byte vector.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(100, 3).unwrap();
    /// filter.insert("test");
    ///
    /// let bytes = filter.serialize();
    /// let restored = BloomFilter::deserialize(&bytes).unwrap();
    /// assert!(restored.query("test"));
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        let is_empty = self.is_empty();
        let payload = if is_empty {
            0
        } else {
            8 + packed::byte_len(self.size)
        };
        let mut bytes = ByteWriter::with_capacity(HEADER_BYTES + payload);

        bytes.write_u8(SERIAL_VERSION); // Byte 0
        bytes.write_u8(BLOOM_FORMAT_ID); // Byte 1
        bytes.write_u8(if is_empty { EMPTY_FLAG_MASK } else { 0 }); // Byte 2: flags
        bytes.write_u8(0); // Byte 3: unused
        bytes.write_u32_le(self.hash_num); // Bytes 4-7
        bytes.write_u64_le(self.size); // Bytes 8-15

        if !is_empty {
            bytes.write_u64_le(self.bits_set);
            bytes.write(&packed::pack(&self.words, self.size));
        }

        bytes.into_bytes()
    }

    /// Deserializes a filter from bytes produced by [`serialize()`](Self::serialize).
    ///
    /// # Errors
    ///
    /// Returns [`IoFailure`](crate::error::ErrorKind::IoFailure) if the data is truncated,
    /// has an unknown version or format id, declares a zero shape, or its stored set-bit
    /// count disagrees with the bits.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        let mut cursor = Cursor::new(bytes);
        let serial_version = cursor.read_u8().map_err(make_error("serial_version"))?;
        let format_id = cursor.read_u8().map_err(make_error("format_id"))?;
        let flags = cursor.read_u8().map_err(make_error("flags"))?;
        cursor.read_u8().map_err(make_error("unused8"))?;

        if format_id != BLOOM_FORMAT_ID {
            return Err(Error::malformed(format!(
                "invalid format id: expected {BLOOM_FORMAT_ID}, got {format_id}"
            )));
        }
        if serial_version != SERIAL_VERSION {
            return Err(Error::malformed(format!(
                "unsupported serial version: expected {SERIAL_VERSION}, got {serial_version}"
            )));
        }

        let hash_num = cursor.read_u32::<LE>().map_err(make_error("hash_num"))?;
        let size = cursor.read_u64::<LE>().map_err(make_error("size"))?;
        check_shape(size, hash_num)?;

        if (flags & EMPTY_FLAG_MASK) != 0 {
            // Nothing in the input bounds `size` here, so the allocation may fail.
            return BloomFilter::try_empty(size, hash_num);
        }

        let stored_bits_set = cursor.read_u64::<LE>().map_err(make_error("bits_set"))?;
        // Check the declared length against the input before allocating anything.
        let start = cursor.position() as usize;
        let remaining = bytes.len().saturating_sub(start);
        let num_bytes = size.div_ceil(8);
        if num_bytes > remaining as u64 {
            return Err(Error::insufficient_data("bit_array"));
        }
        let packed_bits = &bytes[start..start + num_bytes as usize];

        let filter = Self::from_packed(size, hash_num, packed_bits)?;
        if filter.bits_set != stored_bits_set {
            return Err(Error::malformed(format!(
                "bits_set mismatch: header says {stored_bits_set}, bit array has {}",
                filter.bits_set
            )));
        }
        Ok(filter)
    }

    fn from_packed(size: u64, hash_num: u32, packed_bits: &[u8]) -> Result<Self, Error> {
        check_shape(size, hash_num)?;
        let expected = packed::byte_len(size);
        if packed_bits.len() != expected {
            return Err(Error::malformed(format!(
                "bit_array holds {} bytes, size {size} needs {expected}",
                packed_bits.len()
            )));
        }

        let words = packed::unpack(packed_bits, size);
        let bits_set = words.iter().map(|w| u64::from(w.count_ones())).sum();
        Ok(BloomFilter {
            size,
            hash_num,
            bits_set,
            words,
        })
    }
}

fn check_shape(size: u64, hash_num: u32) -> Result<(), Error> {
    if size == 0 || hash_num == 0 {
        return Err(Error::malformed(format!(
            "invalid shape: size={size}, hash_num={hash_num}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_document_json_layout() {
        let mut filter = BloomFilter::new(10, 1).unwrap();
        filter.set_bit(0);
        filter.set_bit(9);
        assert_snapshot!(
            filter.to_json().unwrap(),
            @r#"{"size":10,"hash_num":1,"bit_array":[128,64],"metadata":{"bits_set":2,"fill_ratio":0.2}}"#
        );
    }

    #[test]
    fn test_fill_ratio_rounded() {
        let mut filter = BloomFilter::new(3, 1).unwrap();
        filter.set_bit(1);
        assert_eq!(filter.to_document().metadata.fill_ratio, 0.3333);
    }

    #[test]
    fn test_padding_bits_discarded() {
        let json = r#"{"size":10,"hash_num":2,"bit_array":[255,255],"metadata":{"bits_set":16,"fill_ratio":1.6}}"#;
        let filter = BloomFilter::from_json(json).unwrap();
        assert_eq!(filter.size(), 10);
        assert_eq!(filter.bits_set(), 10);
        assert_eq!(filter.to_document().bit_array, vec![255, 0b1100_0000]);
    }

    #[test]
    fn test_short_bit_array_rejected() {
        let json = r#"{"size":100,"hash_num":2,"bit_array":[1,2],"metadata":{"bits_set":2,"fill_ratio":0.02}}"#;
        let err = BloomFilter::from_json(json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_long_bit_array_rejected() {
        let json = r#"{"size":8,"hash_num":1,"bit_array":[0,0],"metadata":{"bits_set":0,"fill_ratio":0.0}}"#;
        let err = BloomFilter::from_json(json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
        assert_snapshot!(err.message(), @"bit_array holds 2 bytes, size 8 needs 1");
    }

    #[test]
    fn test_missing_field_rejected() {
        let err = BloomFilter::from_json(r#"{"size":100,"bit_array":[]}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_zero_shape_rejected() {
        let json = r#"{"size":0,"hash_num":2,"bit_array":[],"metadata":{"bits_set":0,"fill_ratio":0.0}}"#;
        let err = BloomFilter::from_json(json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_serialize_empty() {
        let filter = BloomFilter::new(100, 3).unwrap();
        let bytes = filter.serialize();
        assert_eq!(bytes.len(), HEADER_BYTES);
        assert_eq!(BloomFilter::deserialize(&bytes).unwrap(), filter);
    }

    #[test]
    fn test_deserialize_truncated() {
        let mut filter = BloomFilter::new(100, 3).unwrap();
        filter.insert("x");
        let bytes = filter.serialize();
        let err = BloomFilter::deserialize(&bytes[..bytes.len() - 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
        assert_snapshot!(err.message(), @"insufficient data: bit_array");
    }

    fn header(flags: u8, hash_num: u32, size: u64) -> Vec<u8> {
        let mut bytes = vec![SERIAL_VERSION, BLOOM_FORMAT_ID, flags, 0];
        bytes.extend_from_slice(&hash_num.to_le_bytes());
        bytes.extend_from_slice(&size.to_le_bytes());
        bytes
    }

    #[test]
    fn test_deserialize_huge_size_without_bits() {
        let mut bytes = header(0, 1, 1 << 62);
        bytes.extend_from_slice(&1u64.to_le_bytes());
        let err = BloomFilter::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
        assert_snapshot!(err.message(), @"insufficient data: bit_array");
    }

    #[test]
    fn test_deserialize_huge_empty_filter() {
        let bytes = header(EMPTY_FLAG_MASK, 1, u64::MAX);
        let err = BloomFilter::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_deserialize_bad_format_id() {
        let mut bytes = BloomFilter::new(8, 1).unwrap().serialize();
        bytes[1] = 0;
        let err = BloomFilter::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_deserialize_bits_set_mismatch() {
        let mut filter = BloomFilter::new(16, 1).unwrap();
        filter.set_bit(4);
        let mut bytes = filter.serialize();
        bytes[HEADER_BYTES] = 2;
        let err = BloomFilter::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }
}
