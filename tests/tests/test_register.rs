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

use braid::{Braid, BraidObject, CodecBindings, Config, Error, TypeRegistry};
use std::sync::Arc;

#[derive(BraidObject, Debug, PartialEq)]
struct First {
    #[braid(id = "a")]
    a: i32,
}

#[derive(BraidObject, Debug, PartialEq)]
struct Second {
    #[braid(id = "b")]
    b: i32,
}

#[derive(BraidObject, Debug, PartialEq)]
struct Pair<A, B> {
    #[braid(id = "left")]
    left: A,
    #[braid(id = "right")]
    right: B,
}

#[derive(BraidObject, Debug, PartialEq, Clone, Copy)]
enum Level {
    Low,
    High,
}

#[test]
fn test_duplicate_id() {
    let braid = Braid::default();
    braid.register::<First>("Shared").unwrap();
    let err = braid.register::<Second>("Shared").unwrap_err();
    assert!(matches!(err, Error::DuplicateId(_)));
}

#[test]
fn test_duplicate_type() {
    let braid = Braid::default();
    braid.register::<First>("First").unwrap();
    let err = braid.register::<First>("Other").unwrap_err();
    assert!(matches!(err, Error::DuplicateType(_)));
    // the failed registration left nothing behind
    braid.register::<Second>("Other").unwrap();
}

#[test]
fn test_reserved_ids() {
    let braid = Braid::default();
    for id in ["array", "null", "list", "set", "map", "nullable", "int32", "string"] {
        let err = braid.register::<First>(id).unwrap_err();
        assert!(
            matches!(err, Error::ReservedId(_) | Error::DuplicateId(_)),
            "{id}: {err}"
        );
    }
    assert!(!braid.registry().is_registered::<First>());
}

#[test]
fn test_invalid_ids() {
    let braid = Braid::default();
    for id in ["", "a[b", "a]", "<a>", "f(x)"] {
        let err = braid.register::<First>(id).unwrap_err();
        assert!(matches!(err, Error::InvalidId(_)), "{id:?}: {err}");
    }
}

#[test]
fn test_invalid_version() {
    let braid = Braid::default();
    let err = braid
        .register_versioned::<First>("First", 1, 2)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidVersion(_)));
    let err = braid
        .register_versioned::<First>("First", -1, -1)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidVersion(_)));
}

#[test]
fn test_closed_generic() {
    let braid = Braid::default();
    let err = braid.register::<Pair<i32, i32>>("Pair").unwrap_err();
    assert!(matches!(err, Error::ClosedGeneric(_)));
}

#[test]
fn test_generic_requires_generic_definition() {
    let braid = Braid::default();
    let err = braid.register_generic::<First>("First", 0, 0).unwrap_err();
    assert!(matches!(err, Error::NotAllowed(_)));
}

#[test]
fn test_array_registration() {
    let braid = Braid::default();
    let err = braid
        .register_custom::<Vec<i32>>(
            "Ints",
            0,
            0,
            CodecBindings {
                write: |_, _| Ok(()),
                read: |_| Ok(Vec::new()),
                skip: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::ArrayRegistration(_)));
}

#[test]
fn test_enum_registration() {
    let braid = Braid::default();
    let err = braid
        .register_custom::<Level>(
            "Level",
            0,
            0,
            CodecBindings {
                write: |_, _| Ok(()),
                read: |_| Ok(Level::Low),
                skip: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::NotAllowed(_)));
}

#[test]
fn test_not_found() {
    let braid = Braid::default();
    let err = braid.registry().resolve_by_id("Missing").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    let err = braid.registry().type_id_of::<First>().unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_lookup_both_ways() {
    let braid = Braid::default();
    braid.register::<First>("First").unwrap();
    braid.register_generic::<Pair<i32, i32>>("Pair", 0, 0).unwrap();
    let registry = braid.registry();
    assert!(registry.is_registered::<First>());
    assert_eq!(&*registry.type_id_of::<First>().unwrap(), "First");
    assert_eq!(registry.resolve_by_id("First").unwrap().wire_id(), "First");
    assert_eq!(
        &*registry.type_id_of::<Pair<First, String>>().unwrap(),
        "Pair[First,string]"
    );
    assert!(registry.resolve_by_id("Pair").unwrap().is_generic_definition());
}

#[test]
fn test_builtin_ids() {
    let braid = Braid::default();
    let registry = braid.registry();
    assert_eq!(&*registry.type_id_of::<bool>().unwrap(), "bool");
    assert_eq!(&*registry.type_id_of::<u8>().unwrap(), "uint8");
    assert_eq!(&*registry.type_id_of::<i64>().unwrap(), "int64");
    assert_eq!(&*registry.type_id_of::<String>().unwrap(), "string");
    assert_eq!(&*registry.type_id_of::<Level>().unwrap(), "int32");
    assert_eq!(
        &*registry.type_id_of::<Vec<Option<String>>>().unwrap(),
        "array[string]"
    );
    assert_eq!(
        &*registry
            .type_id_of::<std::collections::HashMap<String, Vec<i64>>>()
            .unwrap(),
        "map[string,array[int64]]"
    );
}

#[test]
fn test_shared_registry() {
    let registry = Arc::new(TypeRegistry::new());
    let fast = Braid::with_registry(registry.clone(), Config::default());
    let slow = Braid::with_registry(
        registry,
        Config {
            value_array_fast_path: false,
            ..Config::default()
        },
    );
    fast.register::<First>("First").unwrap();
    let bytes = slow.serialize(&First { a: 5 }).unwrap();
    assert_eq!(fast.deserialize::<First>(&bytes).unwrap(), First { a: 5 });
    assert!(!slow.config().is_value_array_fast_path());
}
