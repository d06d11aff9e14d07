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

use std::fmt;

use serde::Serialize;

use super::BloomFilterBuilder;
use crate::error::Error;
use crate::hash::Probes;

/// A case-insensitive Bloom filter over strings.
///
/// Provides fast membership queries with:
/// - No false negatives (inserted elements always return `true`)
/// - Tunable false positive rate
/// - Constant space usage
///
/// Elements are lowercased before hashing, so `"Apple"` and `"apple"` are the same
/// element. This is part of the contract, not an implementation detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    /// Number of addressable bits (m)
    pub(super) size: u64,
    /// Number of probes per element (k)
    pub(super) hash_num: u32,
    /// Count of bits set to 1
    pub(super) bits_set: u64,
    /// Bit array packed into u64 words, bit `i` at `words[i / 64] & (1 << (i % 64))`.
    /// Bits at positions `>= size` are always zero.
    pub(super) words: Vec<u64>,
}

/// Result of [`BloomFilter::estimate_cardinality`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardinalityEstimate {
    /// Estimated number of distinct insertions.
    Estimate(f64),
    /// Every bit is set; the estimator diverges and no finite estimate exists.
    Saturated,
}

impl CardinalityEstimate {
    /// The finite estimate, or `None` when saturated.
    pub fn value(&self) -> Option<f64> {
        match self {
            CardinalityEstimate::Estimate(n) => Some(*n),
            CardinalityEstimate::Saturated => None,
        }
    }

    /// Whether the filter was fully saturated.
    pub fn is_saturated(&self) -> bool {
        matches!(self, CardinalityEstimate::Saturated)
    }
}

/// Read-only summary returned by [`BloomFilter::metadata`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilterMetadata {
    /// Number of bits.
    pub size: u64,
    /// Probes per element.
    pub hash_num: u32,
    /// Count of 1-bits.
    pub bits_set: u64,
    /// `bits_set / size`.
    pub fill_ratio: f64,
}

impl BloomFilter {
    /// Creates an empty filter with `size` bits and `hash_num` probes per element.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if either
    /// argument is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let filter = BloomFilter::new(100, 3).unwrap();
    /// assert!(filter.is_empty());
    /// assert!(!filter.query("anything"));
    /// ```
    pub fn new(size: u64, hash_num: u32) -> Result<Self, Error> {
        BloomFilterBuilder::with_size(size, hash_num).build()
    }

    /// Creates a filter and inserts every non-empty, trimmed line of `lines`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let dict = "abruptly\nabsent\n\n  absurd  \n";
    /// let filter = BloomFilter::from_lines(500, 2, dict.lines()).unwrap();
    /// assert!(filter.query("absurd"));
    /// ```
    pub fn from_lines<'a, I>(size: u64, hash_num: u32, lines: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut filter = Self::new(size, hash_num)?;
        filter.insert_lines(lines);
        Ok(filter)
    }

    pub(super) fn empty(size: u64, hash_num: u32) -> Self {
        let num_words = size.div_ceil(64) as usize;
        BloomFilter {
            size,
            hash_num,
            bits_set: 0,
            words: vec![0u64; num_words],
        }
    }

    /// Like `empty`, but reports a failed allocation instead of aborting.
    pub(super) fn try_empty(size: u64, hash_num: u32) -> Result<Self, Error> {
        let num_words = usize::try_from(size.div_ceil(64))
            .map_err(|_| Error::malformed(format!("size {size} does not fit in memory")))?;
        let mut words = Vec::new();
        words.try_reserve_exact(num_words).map_err(|err| {
            Error::malformed(format!("cannot allocate filter of size {size}: {err}"))
        })?;
        words.resize(num_words, 0);
        Ok(BloomFilter {
            size,
            hash_num,
            bits_set: 0,
            words,
        })
    }

    /// Inserts an element into the filter.
    ///
    /// After insertion, `query(element)` will always return `true`. Inserting the same
    /// element again has no effect.
    pub fn insert(&mut self, element: &str) {
        for index in Probes::new(element, self.hash_num, self.size) {
            self.set_bit(index);
        }
    }

    /// Inserts every non-empty line of `lines` after trimming surrounding whitespace.
    ///
    /// Returns how many lines were inserted.
    pub fn insert_lines<'a, I>(&mut self, lines: I) -> u64
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut inserted = 0;
        for line in lines {
            let word = line.trim();
            if !word.is_empty() {
                self.insert(word);
                inserted += 1;
            }
        }
        inserted
    }

    /// Tests whether an element is possibly in the set.
    ///
    /// Returns:
    /// - `true`: Element was **possibly** inserted (or false positive)
    /// - `false`: Element was **definitely not** inserted
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(100, 3).unwrap();
    /// filter.insert("hello");
    ///
    /// assert!(filter.query("hello"));
    /// assert!(filter.query("HELLO")); // case-insensitive
    /// ```
    pub fn query(&self, element: &str) -> bool {
        if self.is_empty() {
            return false;
        }
        Probes::new(element, self.hash_num, self.size).all(|index| self.get_bit(index))
    }

    /// Tests and inserts an element in a single operation.
    ///
    /// Returns whether the element was possibly already in the set before insertion.
    pub fn contains_and_insert(&mut self, element: &str) -> bool {
        let mut was_present = true;
        for index in Probes::new(element, self.hash_num, self.size) {
            was_present &= !self.set_bit(index);
        }
        was_present
    }

    /// Estimates the number of distinct elements inserted so far.
    ///
    /// Formula: `n = -(m / k) * ln(1 - X / m)` where X is the number of set bits.
    ///
    /// When every bit is set the logarithm diverges, so [`CardinalityEstimate::Saturated`]
    /// is returned instead of infinity.
    pub fn estimate_cardinality(&self) -> CardinalityEstimate {
        if self.bits_set >= self.size {
            tracing::warn!(
                size = self.size,
                hash_num = self.hash_num,
                "bloom filter is saturated, cardinality cannot be estimated"
            );
            return CardinalityEstimate::Saturated;
        }
        let m = self.size as f64;
        let k = f64::from(self.hash_num);
        let ones = self.bits_set as f64;
        CardinalityEstimate::Estimate(-(m / k) * (1.0 - ones / m).ln())
    }

    /// Estimates the current false positive probability.
    ///
    /// Formula: `(1 - e^(-k * n / m))^k` with `n` from
    /// [`estimate_cardinality()`](Self::estimate_cardinality). A saturated filter
    /// reports 1.0, the limit of the formula as `n` grows.
    pub fn estimate_false_positive_rate(&self) -> f64 {
        let n = match self.estimate_cardinality() {
            CardinalityEstimate::Estimate(n) => n,
            CardinalityEstimate::Saturated => return 1.0,
        };
        let m = self.size as f64;
        let k = f64::from(self.hash_num);
        (1.0 - (-k * n / m).exp()).powf(k)
    }

    /// Returns a new filter recognizing elements of either input (bitwise OR).
    ///
    /// Every element reported by `self` or `other` is reported by the union.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeMismatch`](crate::error::ErrorKind::ShapeMismatch) if the filters
    /// differ in `size` or `hash_num`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let mut f1 = BloomFilter::new(100, 3).unwrap();
    /// let mut f2 = BloomFilter::new(100, 3).unwrap();
    /// f1.insert("foo");
    /// f2.insert("bar");
    ///
    /// let union = f1.union(&f2).unwrap();
    /// assert!(union.query("foo"));
    /// assert!(union.query("bar"));
    /// ```
    pub fn union(&self, other: &BloomFilter) -> Result<BloomFilter, Error> {
        let mut result = self.clone();
        result.union_with(other)?;
        Ok(result)
    }

    /// Returns a new filter whose bits are the bitwise AND of both inputs.
    ///
    /// This over-approximates the intersection of the underlying sets: the result may
    /// report elements that were inserted into neither filter, because bits set by
    /// different elements can coincide. It may also miss elements present in both
    /// inputs only through false positives.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeMismatch`](crate::error::ErrorKind::ShapeMismatch) if the filters
    /// differ in `size` or `hash_num`.
    pub fn intersection(&self, other: &BloomFilter) -> Result<BloomFilter, Error> {
        let mut result = self.clone();
        result.intersect_with(other)?;
        Ok(result)
    }

    /// In-place form of [`union()`](Self::union).
    pub fn union_with(&mut self, other: &BloomFilter) -> Result<(), Error> {
        self.check_compatible(other)?;

        // Count bits during union operation (single pass)
        let mut bits_set = 0;
        for (word, other_word) in self.words.iter_mut().zip(&other.words) {
            *word |= *other_word;
            bits_set += u64::from(word.count_ones());
        }
        self.bits_set = bits_set;
        Ok(())
    }

    /// In-place form of [`intersection()`](Self::intersection).
    pub fn intersect_with(&mut self, other: &BloomFilter) -> Result<(), Error> {
        self.check_compatible(other)?;

        let mut bits_set = 0;
        for (word, other_word) in self.words.iter_mut().zip(&other.words) {
            *word &= *other_word;
            bits_set += u64::from(word.count_ones());
        }
        self.bits_set = bits_set;
        Ok(())
    }

    /// Checks if two filters have the same shape, `(size, hash_num)`.
    pub fn is_compatible(&self, other: &BloomFilter) -> bool {
        self.size == other.size && self.hash_num == other.hash_num
    }

    fn check_compatible(&self, other: &BloomFilter) -> Result<(), Error> {
        if self.is_compatible(other) {
            Ok(())
        } else {
            Err(Error::shape_mismatch(
                (self.size, self.hash_num),
                (other.size, other.hash_num),
            ))
        }
    }

    /// Returns size, hash count and fill statistics.
    pub fn metadata(&self) -> FilterMetadata {
        FilterMetadata {
            size: self.size,
            hash_num: self.hash_num,
            bits_set: self.bits_set,
            fill_ratio: self.fill_ratio(),
        }
    }

    /// Returns whether no bit is set.
    pub fn is_empty(&self) -> bool {
        self.bits_set == 0
    }

    /// Returns the number of bits set to 1.
    pub fn bits_set(&self) -> u64 {
        self.bits_set
    }

    /// Returns the fraction of bits set.
    pub fn fill_ratio(&self) -> f64 {
        self.bits_set as f64 / self.size as f64
    }

    /// Returns the number of bits in the filter.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the number of probes per element.
    pub fn hash_num(&self) -> u32 {
        self.hash_num
    }

    /// Gets the value of a single bit.
    pub(super) fn get_bit(&self, bit_index: u64) -> bool {
        let word_index = (bit_index >> 6) as usize;
        let mask = 1u64 << (bit_index & 63);
        (self.words[word_index] & mask) != 0
    }

    /// Sets a single bit, returning whether it was previously unset.
    pub(super) fn set_bit(&mut self, bit_index: u64) -> bool {
        let word_index = (bit_index >> 6) as usize;
        let mask = 1u64 << (bit_index & 63);

        if (self.words[word_index] & mask) == 0 {
            self.words[word_index] |= mask;
            self.bits_set += 1;
            true
        } else {
            false
        }
    }
}

/// Inserts each non-empty line after trimming, like [`BloomFilter::insert_lines`].
impl<'a> Extend<&'a str> for BloomFilter {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        self.insert_lines(iter);
    }
}

impl fmt::Display for BloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<BloomFilter size={}, hash_num={}, bits_set={}, fill_ratio={:.4}>",
            self.size,
            self.hash_num,
            self.bits_set,
            self.fill_ratio()
        )
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_insert_and_query() {
        let mut filter = BloomFilter::new(100, 3).unwrap();

        assert!(!filter.query("hello"));
        filter.insert("hello");
        assert!(filter.query("hello"));
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let mut filter = BloomFilter::new(1000, 4).unwrap();
        filter.insert("Dinosaur");
        assert!(filter.query("dinosaur"));
        assert!(filter.query("DINOSAUR"));
    }

    #[test]
    fn test_insert_sets_at_most_hash_num_bits() {
        let mut filter = BloomFilter::new(10_000, 5).unwrap();
        filter.insert("word");
        assert!(filter.bits_set() >= 1 && filter.bits_set() <= 5);
    }

    #[test]
    fn test_contains_and_insert() {
        let mut filter = BloomFilter::new(1000, 3).unwrap();

        assert!(!filter.contains_and_insert("apple"));
        assert!(filter.contains_and_insert("apple"));
        assert!(filter.query("apple"));
    }

    #[test]
    fn test_insert_lines_skips_blank() {
        let mut filter = BloomFilter::new(500, 2).unwrap();
        let inserted = filter.insert_lines(["alpha\n", "  ", "", " beta "]);
        assert_eq!(inserted, 2);
        assert!(filter.query("alpha"));
        assert!(filter.query("beta"));
    }

    #[test]
    fn test_extend() {
        let mut filter = BloomFilter::new(500, 2).unwrap();
        filter.extend(["x", "y"]);
        assert!(filter.query("x") && filter.query("y"));
    }

    #[test]
    fn test_extend_trims_and_skips_blank() {
        let mut extended = BloomFilter::new(500, 2).unwrap();
        extended.extend(["  alpha \n", "", " \t "]);
        assert!(extended.query("alpha"));

        let mut inserted = BloomFilter::new(500, 2).unwrap();
        inserted.insert("alpha");
        assert_eq!(extended, inserted);
    }

    #[test]
    fn test_saturated_estimate() {
        let mut filter = BloomFilter::new(8, 1).unwrap();
        for bit in 0..8 {
            filter.set_bit(bit);
        }
        let estimate = filter.estimate_cardinality();
        assert!(estimate.is_saturated());
        assert_eq!(estimate.value(), None);
        assert_eq!(filter.estimate_false_positive_rate(), 1.0);
    }

    #[test]
    fn test_empty_estimates() {
        let filter = BloomFilter::new(100, 3).unwrap();
        assert_eq!(filter.estimate_cardinality(), CardinalityEstimate::Estimate(0.0));
        assert_eq!(filter.estimate_false_positive_rate(), 0.0);
    }

    #[test]
    fn test_in_place_shape_mismatch_leaves_filter_untouched() {
        let mut f1 = BloomFilter::new(100, 3).unwrap();
        f1.insert("kept");
        let before = f1.clone();
        let f2 = BloomFilter::new(100, 4).unwrap();

        let err = f1.intersect_with(&f2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        assert_eq!(f1, before);
    }

    #[test]
    fn test_metadata() {
        let mut filter = BloomFilter::new(64, 2).unwrap();
        filter.set_bit(0);
        filter.set_bit(63);
        let metadata = filter.metadata();
        assert_eq!(
            metadata,
            FilterMetadata {
                size: 64,
                hash_num: 2,
                bits_set: 2,
                fill_ratio: 2.0 / 64.0,
            }
        );
    }

    #[test]
    fn test_display() {
        let mut filter = BloomFilter::new(500, 2).unwrap();
        filter.set_bit(3);
        filter.set_bit(499);
        assert_snapshot!(filter, @"<BloomFilter size=500, hash_num=2, bits_set=2, fill_ratio=0.0040>");
    }
}
