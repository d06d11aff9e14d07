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

//! # bloomkit
//!
//! A case-insensitive Bloom filter for word lists, together with a recommender that
//! derives filter size and hash count from a target capacity and false positive rate.
//!
//! The crate exposes the entry points a spell checker needs: construct a filter,
//! [`insert`](bloom::BloomFilter::insert), [`query`](bloom::BloomFilter::query),
//! [`save`](bloom::BloomFilter::save)/[`load`](bloom::BloomFilter::load), and
//! [`recommend`](recommend::recommend).

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod bloom;
pub mod error;
pub mod recommend;

mod codec;
mod hash;
