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

//! Probe index derivation for the Bloom filter.
//!
//! Each element is lowercased once, then every probe `i` in `0..hash_num` hashes the
//! bytes of `lowercase(element) + decimal(i)` with XXHash64 and reduces it modulo the
//! filter size.

use xxhash_rust::xxh64::xxh64;

/// Seed passed to XXHash64 for every probe.
///
/// Filters persisted with one seed cannot be read back with another, so this is fixed.
pub(crate) const PROBE_SEED: u64 = 0;

/// Iterator over the `hash_num` bit indices of one element.
pub(crate) struct Probes {
    buf: Vec<u8>,
    base_len: usize,
    next: u32,
    hash_num: u32,
    size: u64,
}

impl Probes {
    pub(crate) fn new(element: &str, hash_num: u32, size: u64) -> Self {
        let buf = element.to_lowercase().into_bytes();
        let base_len = buf.len();
        Probes {
            buf,
            base_len,
            next: 0,
            hash_num,
            size,
        }
    }
}

impl Iterator for Probes {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.next >= self.hash_num {
            return None;
        }
        self.buf.truncate(self.base_len);
        push_decimal(&mut self.buf, self.next);
        self.next += 1;
        Some(xxh64(&self.buf, PROBE_SEED) % self.size)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.hash_num - self.next) as usize;
        (remaining, Some(remaining))
    }
}

/// Appends the base-10 ASCII digits of `n` to `buf`.
fn push_decimal(buf: &mut Vec<u8>, mut n: u32) {
    let mut digits = [0u8; 10];
    let mut pos = digits.len();
    loop {
        pos -= 1;
        digits[pos] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    buf.extend_from_slice(&digits[pos..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_decimal() {
        let mut buf = b"word".to_vec();
        push_decimal(&mut buf, 0);
        assert_eq!(buf, b"word0");

        let mut buf = vec![];
        push_decimal(&mut buf, u32::MAX);
        assert_eq!(buf, b"4294967295");
    }

    #[test]
    fn test_probe_matches_concatenated_hash() {
        let indices: Vec<u64> = Probes::new("Hello", 3, 1000).collect();
        assert_eq!(indices.len(), 3);
        for (i, index) in indices.into_iter().enumerate() {
            let expected = xxh64(format!("hello{i}").as_bytes(), PROBE_SEED) % 1000;
            assert_eq!(index, expected);
        }
    }

    #[test]
    fn test_probes_are_case_insensitive() {
        let upper: Vec<u64> = Probes::new("ABRUPTLY", 7, 9586).collect();
        let lower: Vec<u64> = Probes::new("abruptly", 7, 9586).collect();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_probes_within_size() {
        assert!(Probes::new("anything", 16, 10).all(|index| index < 10));
    }
}
