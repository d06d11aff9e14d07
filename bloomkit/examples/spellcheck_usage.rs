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

use bloomkit::bloom::BloomFilter;
use bloomkit::recommend::recommend;

const DICTIONARY: &str = "\
abandon
ability
abruptly
absent
absurd
academic
";

fn main() {
    // Size the filter from the number of dictionary lines
    let num_words = DICTIONARY.lines().filter(|l| !l.trim().is_empty()).count() as u64;
    let params = recommend(num_words, 0.01).expect("valid sizing parameters");
    println!("Recommendation for {num_words} words at 1%: {params:?}");

    let filter = BloomFilter::from_lines(params.size, params.hash_num, DICTIONARY.lines())
        .expect("valid filter shape");
    println!("Built {filter}");

    for word in ["abruptly", "Absurd", "dfghjkk"] {
        let verdict = if filter.query(word) {
            "Might exist"
        } else {
            "Not found"
        };
        println!("{word}: {verdict}");
    }

    let path = std::env::temp_dir().join("bloomkit-spellcheck.json");
    filter.save(&path).expect("filter saved");
    let restored = BloomFilter::load(&path).expect("filter loaded");
    assert_eq!(filter, restored);
    println!("Round-tripped through {}", path.display());

    let report = restored
        .validate_against(num_words, 0.01)
        .expect("valid validation target");
    println!("Validation: {report:?}");
}
