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

//! # Braid Core
//!
//! Core of the braid object-graph serializer. It writes arbitrary graphs of
//! user types (shared references and cycles included) into a compact
//! little-endian stream, and reads them back in a later build whose types
//! may have gained or lost fields.
//!
//! ## Architecture
//!
//! - **`braid`**: the [`Braid`] entry point
//! - **`buffer`**: bounds-checked `Writer`/`Reader` over little-endian primitives
//! - **`meta`**: the type id grammar and field declarations
//! - **`resolver`**: type registry, compiled codecs, reference scopes and call contexts
//! - **`serializer`**: `Serializer` implementations for built-in and wrapper types
//! - **`types`**: reserved tokens, built-in type ids and type kinds
//! - **`error`**: error type and its taxonomy
//!
//! ## Wire form
//!
//! Every value starts with its type id, a length-prefixed string such as
//! `int32`, `Person` or `map[string,array[int64]]`. Reference kinds follow
//! with an Int32 reference id, where `0` is null and a repeated id refers
//! back to a value written earlier in the same call. Objects then carry
//! their version and a list of `(field id, value)` pairs closed by an empty
//! field id.
//!
//! ## Usage
//!
//! This crate is usually used through the `braid` crate, which adds the
//! `#[derive(BraidObject)]` macro.
//!
//! ```rust
//! use braid_core::braid::Braid;
//! use std::collections::HashMap;
//!
//! let braid = Braid::default();
//! let mut scores = HashMap::new();
//! scores.insert("alice".to_string(), 3i64);
//! let bytes = braid.serialize(&scores).unwrap();
//! let decoded: HashMap<String, i64> = braid.deserialize(&bytes).unwrap();
//! assert_eq!(scores, decoded);
//! ```

pub mod braid;
pub mod buffer;
pub mod config;
pub mod error;
pub mod meta;
pub mod resolver;
pub mod serializer;
pub mod types;

pub use crate::braid::{global, Braid};
pub use crate::config::Config;
pub use crate::error::{Error, ErrorKind};
pub use crate::resolver::context::{ReadContext, WriteContext};
pub use crate::resolver::type_registry::{CodecBindings, TypeRegistry};
pub use crate::serializer::array::ArrayLike;
pub use crate::serializer::polymorphic::Covariant;
pub use crate::serializer::{BraidDefault, Declaration, ObjectSerializer, Serializer};

// used by code generated with `#[derive(BraidObject)]`
pub use inventory;
