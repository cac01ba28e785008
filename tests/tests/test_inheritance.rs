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


use braid::{Braid, BraidObject, Error};
use braid_core::meta::FieldDecls;
use test_helpers::{roundtrip, test_roundtrip};

#[derive(BraidObject, Debug, PartialEq)]
struct Animal {
    #[braid(id = "name")]
    name: String,
    #[braid(id = "legs")]
    legs: u8,
}

#[derive(BraidObject, Debug, PartialEq)]
struct Dog {
    #[braid(base)]
    animal: Animal,
    #[braid(id = "breed")]
    breed: String,
}

#[derive(BraidObject, Debug, PartialEq)]
struct Puppy {
    #[braid(base)]
    dog: Dog,
    #[braid(id = "age_weeks")]
    age_weeks: u32,
}

fn rex() -> Dog {
    Dog {
        animal: Animal {
            name: "Rex".to_string(),
            legs: 4,
        },
        breed: "collie".to_string(),
    }
}

#[test]
fn test_base_fields_are_lifted() {
    let braid = Braid::default();
    // the base type itself does not need to be registered
    braid.register::<Dog>("Dog").unwrap();
    let fields = braid.registry().fields_of::<Dog>().unwrap();
    let ids: Vec<&str> = fields.fields().iter().map(|f| f.id()).collect();
    assert_eq!(ids, vec!["breed", "legs", "name"]);
    test_roundtrip(&braid, rex());
}

#[test]
fn test_two_levels() {
    let braid = Braid::default();
    braid.register::<Puppy>("Puppy").unwrap();
    test_roundtrip(
        &braid,
        Puppy {
            dog: rex(),
            age_weeks: 9,
        },
    );
}

#[derive(BraidObject, Debug, PartialEq)]
struct Clash {
    #[braid(base)]
    animal: Animal,
    #[braid(id = "name")]
    nickname: String,
}

#[test]
fn test_duplicate_id_across_hierarchy() {
    let braid = Braid::default();
    braid.register::<Clash>("Clash").unwrap();
    let err = braid
        .serialize(&Clash {
            animal: Animal {
                name: "a".to_string(),
                legs: 2,
            },
            nickname: "b".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateFieldId { .. }));
}

#[derive(BraidObject, Debug, PartialEq)]
#[braid(declare = "Temperature::declare")]
struct Temperature {
    celsius: f64,
}

impl Temperature {
    fn declare(decls: &mut FieldDecls<Self>) {
        decls
            .getter::<f64>("celsius", Some("fahrenheit"), |t| t.celsius * 9.0 / 5.0 + 32.0)
            .setter::<f64>("celsius", None, |t, f| t.celsius = (f - 32.0) * 5.0 / 9.0);
    }
}

#[test]
fn test_split_accessors() {
    let braid = Braid::default();
    braid.register::<Temperature>("Temperature").unwrap();
    let bytes = braid.serialize(&Temperature { celsius: 100.0 }).unwrap();
    assert!(bytes.windows(10).any(|w| w == b"fahrenheit"));
    let result: Temperature = braid.deserialize(&bytes).unwrap();
    assert_eq!(result.celsius, 100.0);
}

#[derive(BraidObject, Debug, PartialEq)]
#[braid(declare = "ReadOnly::declare")]
struct ReadOnly {
    total: i64,
}

impl ReadOnly {
    fn declare(decls: &mut FieldDecls<Self>) {
        decls.getter::<i64>("total", Some("total"), |r| r.total);
    }
}

#[test]
fn test_missing_setter() {
    let braid = Braid::default();
    braid.register::<ReadOnly>("ReadOnly").unwrap();
    let err = braid.serialize(&ReadOnly { total: 1 }).unwrap_err();
    assert!(matches!(err, Error::MissingAccessor { .. }));
}

#[derive(BraidObject, Debug, PartialEq)]
#[braid(declare = "Mismatched::declare")]
struct Mismatched {
    amount: i64,
}

impl Mismatched {
    fn declare(decls: &mut FieldDecls<Self>) {
        decls
            .getter::<i64>("amount", Some("amount"), |m| m.amount)
            .setter::<i32>("amount", None, |m, v| m.amount = i64::from(v));
    }
}

#[test]
fn test_accessor_type_mismatch() {
    let braid = Braid::default();
    braid.register::<Mismatched>("Mismatched").unwrap();
    let err = braid.serialize(&Mismatched { amount: 1 }).unwrap_err();
    assert!(matches!(err, Error::AccessorTypeMismatch(_)));
}

#[test]
fn test_base_type_alone() {
    let braid = Braid::default();
    braid.register::<Animal>("Animal").unwrap();
    let animal = roundtrip(
        &braid,
        &Animal {
            name: "cat".to_string(),
            legs: 4,
        },
    );
    assert_eq!(animal.legs, 4);
}
