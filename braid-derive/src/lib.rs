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

//! # Braid Derive Macros
//!
//! `#[derive(BraidObject)]` generates the serializer of a user type.
//!
//! ## Structs
//!
//! Every field carrying `#[braid(id = "..")]` is serialized under that id.
//! Unmarked fields are left out of the stream and rebuilt with
//! `Default::default()` on read. A field marked `#[braid(base)]` embeds a
//! base object whose own fields are lifted into this type.
//!
//! ```rust, ignore
//! use braid::BraidObject;
//!
//! #[derive(BraidObject, Debug, PartialEq)]
//! #[braid(type_id = "Person", version = 2, min_version = 1)]
//! struct Person {
//!     #[braid(id = "name")]
//!     name: String,
//!     #[braid(id = "age")]
//!     age: u32,
//!     // not serialized
//!     cache: Option<String>,
//! }
//! ```
//!
//! The generated code implements `BraidDefault`, `ObjectSerializer` and
//! `Serializer`. A declared `type_id` also submits the type for
//! auto-registration, picked up by `TypeRegistry::scan`.
//!
//! Structs are reference types: each value carries a reference id, and
//! shared values behind `Rc`/`Arc` are written once. `#[braid(value)]` opts
//! out of the reference id.
//!
//! Generic structs are registered once through `register_generic` and
//! identified as `Definition[arg1,arg2]` on the wire.
//!
//! ## Enums
//!
//! Fieldless enums are written as their `#[repr]` integer, `i32` by default,
//! and share its type id.
//!
//! ```rust, ignore
//! #[derive(BraidObject, Debug, PartialEq)]
//! #[repr(u8)]
//! enum Color {
//!     Red = 1,
//!     Green = 2,
//! }
//! ```
//!
//! The generated code refers to `::braid_core`, so crates deriving
//! `BraidObject` depend on `braid-core` next to `braid`.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod object;
mod util;

/// Derive macro for braid object serializers. See the crate docs for attributes.
#[proc_macro_derive(BraidObject, attributes(braid))]
pub fn proc_macro_derive_braid_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    object::derive_object(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
