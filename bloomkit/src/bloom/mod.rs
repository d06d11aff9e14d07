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

//! Case-insensitive Bloom filter over strings.
//!
//! A Bloom filter is a space-efficient probabilistic data structure used to test whether
//! an element is a member of a set. False positive matches are possible, but false negatives
//! are not. In other words, a query returns either "possibly in set" or "definitely not in set".
//!
//! # Properties
//!
//! - **No false negatives**: If an element was inserted, `query()` will always return `true`
//! - **Possible false positives**: `query()` may return `true` for elements never inserted
//! - **Case-insensitive**: elements are lowercased before hashing
//! - **Fixed size**: the bit array never grows or shrinks
//!
//! # Usage
//!
//! ```rust
//! use bloomkit::bloom::BloomFilterBuilder;
//!
//! // Create a filter sized for 1000 words with 1% false positive rate
//! let mut filter = BloomFilterBuilder::with_accuracy(1000, 0.01)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! filter.insert("apple");
//! filter.insert("banana");
//!
//! assert!(filter.query("apple"));
//! assert!(filter.query("Banana"));
//! assert!(!filter.query("grape")); // never inserted (probably)
//!
//! println!("{filter}");
//! println!("Est. items: {:?}", filter.estimate_cardinality().value());
//! println!("Est. FPP: {:.4}%", filter.estimate_false_positive_rate() * 100.0);
//! ```
//!
//! # Set Operations
//!
//! Filters of the same shape (`size` and `hash_num`) can be combined. Combining filters of
//! different shapes fails with [`ShapeMismatch`](crate::error::ErrorKind::ShapeMismatch).
//!
//! - [`BloomFilter::union`] recognizes elements of either filter.
//! - [`BloomFilter::intersection`] ANDs the bit arrays. The result over-approximates the
//!   intersection of the underlying sets and may report elements present in neither.
//!
//! # Hashing
//!
//! Probe `i` of element `e` is `xxh64(lowercase(e) + decimal(i)) mod size`, seed 0, for
//! `i` in `0..hash_num`.
//!
//! # Concurrency
//!
//! The filter holds no interior mutability. Share it behind a `RwLock` when several
//! threads insert: concurrent inserts commute, but `union`, `intersection` and `save`
//! read the whole array and need a consistent snapshot.

mod builder;
mod persist;
mod sketch;
mod validate;

pub use self::builder::BloomFilterBuilder;
pub use self::builder::MIN_HASH_NUM;
pub use self::builder::MIN_SIZE;
pub use self::persist::DocumentMetadata;
pub use self::persist::FilterDocument;
pub use self::sketch::BloomFilter;
pub use self::sketch::CardinalityEstimate;
pub use self::sketch::FilterMetadata;
pub use self::validate::ValidationReport;
pub use self::validate::ValidationTolerance;
pub use self::validate::DEFAULT_TARGET_FP_RATE;
