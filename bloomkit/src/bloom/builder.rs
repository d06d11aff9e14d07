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

use super::BloomFilter;
use crate::error::Error;
use crate::recommend::ParamRecommender;

/// Smallest accepted bit count.
pub const MIN_SIZE: u64 = 1;
/// Smallest accepted hash count.
pub const MIN_HASH_NUM: u32 = 1;

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two construction modes:
/// - [`with_accuracy()`](Self::with_accuracy): Specify expected items and false positive rate
/// - [`with_size()`](Self::with_size): Specify bit count and hash count directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloomFilterBuilder {
    size: u64,
    hash_num: u32,
}

impl BloomFilterBuilder {
    /// Creates a builder with the parameters recommended for a target accuracy.
    ///
    /// # Arguments
    ///
    /// - `num_elements`: Expected number of distinct elements
    /// - `probability`: Target false positive probability (e.g., 0.01 for 1%)
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter`](crate::error::ErrorKind::InvalidParameter) if
    /// `num_elements` is 0 or `probability` is not in (0.0, 1.0).
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_accuracy(1000, 0.01)
    ///     .unwrap()
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(filter.size(), 9586);
    /// assert_eq!(filter.hash_num(), 7);
    /// ```
    pub fn with_accuracy(num_elements: u64, probability: f64) -> Result<Self, Error> {
        let recommender = ParamRecommender::new(num_elements, probability)?;
        Ok(BloomFilterBuilder {
            size: recommender.recommend_size(),
            hash_num: recommender.recommend_num_hashes(),
        })
    }

    /// Creates a builder with manual size specification.
    ///
    /// Unlike word-backed filters, the size is used exactly as given: probe indices are
    /// reduced modulo `size`, and persisted filters record `size` verbatim.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_size(500, 2).build().unwrap();
    /// assert_eq!(filter.size(), 500);
    /// ```
    pub fn with_size(size: u64, hash_num: u32) -> Self {
        BloomFilterBuilder { size, hash_num }
    }

    /// Bit count the filter will be built with.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Hash count the filter will be built with.
    pub fn hash_num(&self) -> u32 {
        self.hash_num
    }

    /// Builds an empty Bloom filter.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if the size
    /// is below [`MIN_SIZE`] or the hash count is below [`MIN_HASH_NUM`].
    pub fn build(self) -> Result<BloomFilter, Error> {
        if self.size < MIN_SIZE {
            return Err(Error::invalid_argument(format!(
                "size must be at least {MIN_SIZE}"
            )));
        }
        if self.hash_num < MIN_HASH_NUM {
            return Err(Error::invalid_argument(format!(
                "hash_num must be at least {MIN_HASH_NUM}"
            )));
        }
        Ok(BloomFilter::empty(self.size, self.hash_num))
    }
}
