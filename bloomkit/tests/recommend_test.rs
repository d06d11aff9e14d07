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

use bloomkit::bloom::BloomFilterBuilder;
use bloomkit::error::ErrorKind;
use bloomkit::recommend::recommend;
use bloomkit::recommend::ParamRecommender;
use googletest::assert_that;
use googletest::prelude::near;

#[test]
fn test_recommendations() {
    let recommender = ParamRecommender::new(1000, 0.01).unwrap();
    let hashes = recommender.recommend_num_hashes();
    let size = recommender.recommend_size();
    let bits_per_element = recommender.bits_per_element();

    assert!(hashes > 0);
    assert!(size > 0);
    assert_that!(bits_per_element, near(9.6, 0.05));
}

#[test]
fn test_hashes_follow_recommended_size() {
    for (n, p) in [(1, 0.5), (100, 0.1), (10_000, 0.001), (235_976, 0.01)] {
        let recommender = ParamRecommender::new(n, p).unwrap();
        let m = recommender.recommend_size() as f64;
        let expected = (m / n as f64 * std::f64::consts::LN_2).ceil() as u32;
        assert_eq!(recommender.recommend_num_hashes(), expected, "n={n}, p={p}");
    }
}

#[test]
fn test_tighter_target_needs_more_bits() {
    let loose = recommend(1000, 0.1).unwrap();
    let tight = recommend(1000, 0.001).unwrap();
    assert!(tight.size > loose.size);
    assert!(tight.hash_num > loose.hash_num);
    assert!(tight.bits_per_element > loose.bits_per_element);
}

#[test]
fn test_invalid_parameters() {
    for (n, p) in [(0, 0.01), (100, 0.0), (100, 1.0), (100, -1.0), (100, f64::NAN)] {
        let err = recommend(n, p).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter, "n={n}, p={p}");
    }
}

#[test]
fn test_recommended_filter_meets_target() {
    let params = recommend(1000, 0.01).unwrap();
    let mut filter = BloomFilterBuilder::with_size(params.size, params.hash_num)
        .build()
        .unwrap();
    for i in 0..1000 {
        filter.insert(&format!("word{i}"));
    }

    let report = filter.validate_against(1000, 0.01).unwrap();
    assert!(report.is_ok());

    let false_positives = (0..10_000)
        .filter(|i| filter.query(&format!("absent{i}")))
        .count();
    // target is 1%, i.e. ~100 of 10k
    assert!(false_positives < 200, "false positives: {false_positives}");

    let estimate = filter.estimate_cardinality().value().unwrap();
    assert_that!(estimate, near(1000.0, 100.0));
    assert_that!(filter.estimate_false_positive_rate(), near(0.01, 0.005));
}
