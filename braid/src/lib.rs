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

//! # Braid
//!
//! Braid is a versioned binary serializer for graphs of typed objects.
//! Shared references and cycles survive a round trip, values are
//! identified by stable string type ids, and objects carry a version so that
//! a later build can read what an earlier one wrote, and the other way
//! around.
//!
//! ## Key Features
//!
//! - **Object graphs**: `Rc`/`Arc` values are written once and referenced
//!   afterwards. `Rc<RefCell<T>>` and `Arc<Mutex<T>>` may form cycles.
//! - **Versioning**: a stream whose version differs from the current one is
//!   read field by field. Unknown fields are skipped and missing ones keep
//!   their defaults.
//! - **Polymorphism**: `Box<dyn Trait>` and `Rc<dyn Trait>` slots write the
//!   runtime type and read it back through the registry.
//! - **Thread safety**: one `Braid` serves any number of threads. The
//!   registry is read-mostly and every call has its own reference scope.
//!
//! ## Object Serialization
//!
//! ```rust, ignore
//! use braid::{Braid, BraidObject, Error};
//! use std::collections::HashMap;
//!
//! #[derive(BraidObject, Debug, PartialEq)]
//! #[braid(version = 1)]
//! struct Person {
//!     #[braid(id = "name")]
//!     name: String,
//!     #[braid(id = "age")]
//!     age: i32,
//!     #[braid(id = "address")]
//!     address: Address,
//!     #[braid(id = "hobbies")]
//!     hobbies: Vec<String>,
//!     #[braid(id = "metadata")]
//!     metadata: HashMap<String, String>,
//! }
//!
//! #[derive(BraidObject, Debug, PartialEq)]
//! struct Address {
//!     #[braid(id = "street")]
//!     street: String,
//!     #[braid(id = "city")]
//!     city: String,
//! }
//!
//! fn main() -> Result<(), Error> {
//!     let braid = Braid::default();
//!     braid.register::<Person>("Person")?;
//!     braid.register::<Address>("Address")?;
//!
//!     let person = Person {
//!         name: "John Doe".to_string(),
//!         age: 30,
//!         address: Address {
//!             street: "123 Main St".to_string(),
//!             city: "New York".to_string(),
//!         },
//!         hobbies: vec!["reading".to_string(), "coding".to_string()],
//!         metadata: HashMap::from([("role".to_string(), "developer".to_string())]),
//!     };
//!
//!     let bytes = braid.serialize(&person)?;
//!     let decoded: Person = braid.deserialize(&bytes)?;
//!     assert_eq!(person, decoded);
//!     Ok(())
//! }
//! ```
//!
//! ## Shared References
//!
//! ```rust, ignore
//! use braid::{Braid, BraidObject};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! #[derive(BraidObject)]
//! struct Node {
//!     #[braid(id = "value")]
//!     value: i32,
//!     #[braid(id = "next")]
//!     next: Option<Rc<RefCell<Node>>>,
//! }
//!
//! let braid = Braid::default();
//! braid.register::<Node>("Node")?;
//! let node = Rc::new(RefCell::new(Node { value: 1, next: None }));
//! node.borrow_mut().next = Some(node.clone());
//!
//! let bytes = braid.serialize(&node)?;
//! let decoded: Rc<RefCell<Node>> = braid.deserialize(&bytes)?;
//! let next = decoded.borrow().next.clone().unwrap();
//! assert!(Rc::ptr_eq(&decoded, &next));
//! ```
//!
//! ## Trait Objects
//!
//! ```rust, ignore
//! use braid::{polymorphic, Braid, BraidObject, Serializer};
//!
//! pub trait Shape: Serializer {
//!     fn area(&self) -> f64;
//! }
//!
//! #[derive(BraidObject)]
//! struct Circle {
//!     #[braid(id = "radius")]
//!     radius: f64,
//! }
//!
//! impl Shape for Circle {
//!     fn area(&self) -> f64 {
//!         std::f64::consts::PI * self.radius * self.radius
//!     }
//! }
//!
//! polymorphic!(dyn Shape => Circle);
//!
//! let braid = Braid::default();
//! braid.register::<Circle>("Circle")?;
//! let shapes: Vec<Box<dyn Shape>> = vec![Box::new(Circle { radius: 1.0 })];
//! let bytes = braid.serialize(&shapes)?;
//! ```
//!
//! ## Versioning
//!
//! Each object type has a current version and a minimum supported version.
//! A stream with the current version is read in the compiled field order.
//! Any other version at or above the minimum is read field by field by id.
//! Older streams fail with `VersionUnsupported`.
//!
//! ## Configuration
//!
//! ```rust
//! use braid::Braid;
//!
//! let braid = Braid::default()
//!     .value_array_fast_path(false)
//!     .max_depth(64);
//! ```

pub use braid_core::{
    braid::global, custom_serializer, polymorphic, Braid, BraidDefault, CodecBindings, Config,
    Covariant, Declaration, Error, ErrorKind, ObjectSerializer, ReadContext, Serializer,
    TypeRegistry, WriteContext,
};
pub use braid_derive::BraidObject;
