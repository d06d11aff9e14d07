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

use serde::Serialize;

use super::BloomFilter;
use crate::error::Error;
use crate::recommend::ParamRecommender;

/// False positive rate assumed by [`BloomFilter::validate_against`].
pub const DEFAULT_TARGET_FP_RATE: f64 = 0.01;

/// Relative deviation from the recommendation accepted by parameter validation.
///
/// A parameter passes when `|actual - recommended| / recommended < tolerance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationTolerance {
    /// Allowed relative deviation of `size`.
    pub size: f64,
    /// Allowed relative deviation of `hash_num`.
    pub hash_num: f64,
}

impl Default for ValidationTolerance {
    fn default() -> Self {
        ValidationTolerance {
            size: 0.10,
            hash_num: 0.20,
        }
    }
}

/// Outcome of comparing a filter's shape with the recommended one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Whether `size` is within the size tolerance.
    pub size_ok: bool,
    /// Whether `hash_num` is within the hash count tolerance.
    pub hashes_ok: bool,
    /// Recommended bit count for the expected load.
    pub recommended_size: u64,
    /// Recommended hash count for the expected load.
    pub recommended_hashes: u32,
}

impl ValidationReport {
    /// Whether both parameters are within tolerance.
    pub fn is_ok(&self) -> bool {
        self.size_ok && self.hashes_ok
    }
}

impl BloomFilter {
    /// Checks this filter's shape against the recommendation for `expected_num_items` at
    /// `target_fp_rate`, using the default [`ValidationTolerance`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter`](crate::error::ErrorKind::InvalidParameter) if the
    /// recommender rejects the inputs.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::{BloomFilter, DEFAULT_TARGET_FP_RATE};
    /// let filter = BloomFilter::new(9586, 7).unwrap();
    /// let report = filter.validate_against(1000, DEFAULT_TARGET_FP_RATE).unwrap();
    /// assert!(report.is_ok());
    ///
    /// let report = BloomFilter::new(500, 2)
    ///     .unwrap()
    ///     .validate_against(1000, 0.01)
    ///     .unwrap();
    /// assert!(!report.size_ok);
    /// ```
    pub fn validate_against(
        &self,
        expected_num_items: u64,
        target_fp_rate: f64,
    ) -> Result<ValidationReport, Error> {
        self.validate_against_with(
            expected_num_items,
            target_fp_rate,
            ValidationTolerance::default(),
        )
    }

    /// Like [`validate_against()`](Self::validate_against) with explicit tolerances.
    pub fn validate_against_with(
        &self,
        expected_num_items: u64,
        target_fp_rate: f64,
        tolerance: ValidationTolerance,
    ) -> Result<ValidationReport, Error> {
        let recommender = ParamRecommender::new(expected_num_items, target_fp_rate)?;
        let recommended_size = recommender.recommend_size();
        let recommended_hashes = recommender.recommend_num_hashes();

        let report = ValidationReport {
            size_ok: within(self.size as f64, recommended_size as f64, tolerance.size),
            hashes_ok: within(
                f64::from(self.hash_num),
                f64::from(recommended_hashes),
                tolerance.hash_num,
            ),
            recommended_size,
            recommended_hashes,
        };
        if !report.is_ok() {
            tracing::warn!(
                size = self.size,
                hash_num = self.hash_num,
                recommended_size,
                recommended_hashes,
                "bloom filter parameters are outside the recommended tolerance"
            );
        }
        tracing::debug!(
            size = self.size,
            hash_num = self.hash_num,
            recommended_size,
            recommended_hashes,
            size_ok = report.size_ok,
            hashes_ok = report.hashes_ok,
            "validated bloom filter parameters"
        );
        Ok(report)
    }
}

fn within(actual: f64, recommended: f64, tolerance: f64) -> bool {
    (actual - recommended).abs() / recommended < tolerance
}
