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

//! Sizing recommendations for Bloom filters.
//!
//! Given the expected number of distinct elements `n` and a target false positive
//! probability `p`, the recommender derives the bit count `m` and hash count `k` that
//! minimize the expected error at that load:
//!
//! ```text
//! m = ceil(-n * ln(p) / ln(2)^2)
//! k = ceil((m / n) * ln(2))
//! ```
//!
//! # Usage
//!
//! ```rust
//! use bloomkit::recommend::ParamRecommender;
//!
//! let recommender = ParamRecommender::new(1000, 0.01).unwrap();
//! assert_eq!(recommender.recommend_size(), 9586);
//! assert_eq!(recommender.recommend_num_hashes(), 7);
//! ```

use std::f64::consts::LN_2;

use serde::Serialize;

use crate::error::Error;

/// Aggregated output of [`ParamRecommender::recommend`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecommendedParameters {
    /// Recommended number of bits (m).
    pub size: u64,
    /// Recommended number of hash probes (k).
    pub hash_num: u32,
    /// `size / num_elements`, rounded to two decimals.
    pub bits_per_element: f64,
    /// The target false positive probability the recommendation was computed for.
    pub false_positive_rate: f64,
}

/// Derives Bloom filter parameters from a target load and false positive rate.
///
/// Construction validates the inputs, so every method afterwards is infallible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRecommender {
    num_elements: u64,
    probability: f64,
}

impl ParamRecommender {
    /// Creates a recommender for `num_elements` distinct items at false positive rate
    /// `probability`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter`](crate::error::ErrorKind::InvalidParameter) if
    /// `num_elements` is 0 or `probability` is not strictly between 0 and 1.
    pub fn new(num_elements: u64, probability: f64) -> Result<Self, Error> {
        if num_elements == 0 {
            return Err(Error::invalid_parameter("num_elements must be greater than 0"));
        }
        // Written so that NaN fails too.
        if !(probability > 0.0 && probability < 1.0) {
            return Err(
                Error::invalid_parameter("probability must be in the open interval (0, 1)")
                    .with_context("probability", probability),
            );
        }
        Ok(ParamRecommender {
            num_elements,
            probability,
        })
    }

    /// Expected number of distinct elements.
    pub fn num_elements(&self) -> u64 {
        self.num_elements
    }

    /// Target false positive probability.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Optimal bit count: `ceil(-n * ln(p) / ln(2)^2)`, at least 1.
    pub fn recommend_size(&self) -> u64 {
        let n = self.num_elements as f64;
        let bits = (-(n * self.probability.ln()) / (LN_2 * LN_2)).ceil();
        (bits as u64).max(1)
    }

    /// Optimal hash count for the recommended size: `ceil((m / n) * ln(2))`, at least 1.
    pub fn recommend_num_hashes(&self) -> u32 {
        let m = self.recommend_size() as f64;
        let n = self.num_elements as f64;
        // Ceil to avoid selecting too few hashes.
        let k = (m / n * LN_2).ceil();
        k.clamp(1.0, f64::from(u32::MAX)) as u32
    }

    /// Bits of filter per expected element. Informational only.
    pub fn bits_per_element(&self) -> f64 {
        self.recommend_size() as f64 / self.num_elements as f64
    }

    /// Computes all recommendations at once.
    pub fn recommend(&self) -> RecommendedParameters {
        RecommendedParameters {
            size: self.recommend_size(),
            hash_num: self.recommend_num_hashes(),
            bits_per_element: (self.bits_per_element() * 100.0).round() / 100.0,
            false_positive_rate: self.probability,
        }
    }
}

/// Shorthand for `ParamRecommender::new(num_elements, probability)?.recommend()`.
///
/// # Examples
///
/// ```
/// let params = bloomkit::recommend::recommend(235_976, 0.01).unwrap();
/// assert_eq!(params.hash_num, 7);
/// assert_eq!(params.false_positive_rate, 0.01);
/// ```
pub fn recommend(num_elements: u64, probability: f64) -> Result<RecommendedParameters, Error> {
    Ok(ParamRecommender::new(num_elements, probability)?.recommend())
}
