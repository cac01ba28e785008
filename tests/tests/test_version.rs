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


use braid::{Braid, Error};
use std::collections::HashMap;
use std::rc::Rc;
use test_helpers::init_logger;

mod v1 {
    use braid::BraidObject;

    #[derive(BraidObject, Debug, PartialEq)]
    #[braid(version = 1)]
    pub struct Profile {
        #[braid(id = "name")]
        pub name: String,
        #[braid(id = "age")]
        pub age: i32,
    }
}

mod v2 {
    use braid::BraidObject;
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(BraidObject, Debug, PartialEq)]
    pub struct Address {
        #[braid(id = "city")]
        pub city: String,
    }

    #[derive(BraidObject, Debug, PartialEq)]
    #[braid(version = 2, min_version = 1)]
    pub struct Profile {
        #[braid(id = "name")]
        pub name: String,
        #[braid(id = "age")]
        pub age: i32,
        #[braid(id = "email")]
        pub email: String,
        #[braid(id = "address")]
        pub address: Option<Rc<Address>>,
        #[braid(id = "scores")]
        pub scores: Vec<i32>,
        #[braid(id = "labels")]
        pub labels: HashMap<String, Vec<String>>,
    }
}

mod v3 {
    use braid::BraidObject;

    #[derive(BraidObject, Debug, PartialEq)]
    #[braid(version = 3, min_version = 2)]
    pub struct Profile {
        #[braid(id = "name")]
        pub name: String,
    }
}

fn old_braid() -> Braid {
    let braid = Braid::default();
    braid.register::<v1::Profile>("Profile").unwrap();
    braid
}

fn new_braid() -> Braid {
    let braid = Braid::default();
    braid.register::<v2::Profile>("Profile").unwrap();
    braid.register::<v2::Address>("Address").unwrap();
    braid
}

fn new_profile() -> v2::Profile {
    v2::Profile {
        name: "Grace".to_string(),
        age: 85,
        email: "grace@example.com".to_string(),
        address: Some(Rc::new(v2::Address {
            city: "Arlington".to_string(),
        })),
        scores: vec![3, 1, 4, 1, 5],
        labels: HashMap::from([("lang".to_string(), vec!["COBOL".to_string()])]),
    }
}

#[test]
fn test_old_reader_skips_added_fields() {
    init_logger();
    let writer = new_braid();
    let reader = old_braid();
    // the old reader still needs to know nested types it steps over
    reader.register::<v2::Address>("Address").unwrap();
    let bytes = writer.serialize(&new_profile()).unwrap();
    let profile: v1::Profile = reader.deserialize(&bytes).unwrap();
    assert_eq!(
        profile,
        v1::Profile {
            name: "Grace".to_string(),
            age: 85,
        }
    );
}

#[test]
fn test_old_reader_needs_skipped_object_types() {
    let writer = new_braid();
    let reader = old_braid();
    let bytes = writer.serialize(&new_profile()).unwrap();
    let err = reader.deserialize::<v1::Profile>(&bytes).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_skipped_object_keeps_reference_ids() {
    let writer = new_braid();
    let reader = old_braid();
    reader.register::<v2::Address>("Address").unwrap();
    let bytes = writer
        .serialize(&vec![new_profile(), new_profile()])
        .unwrap();
    let profiles: Vec<v1::Profile> = reader.deserialize(&bytes).unwrap();
    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[1].name, "Grace");
}

#[test]
fn test_new_reader_defaults_missing_fields() {
    init_logger();
    let writer = old_braid();
    let reader = new_braid();
    let bytes = writer
        .serialize(&v1::Profile {
            name: "Alan".to_string(),
            age: 41,
        })
        .unwrap();
    let profile: v2::Profile = reader.deserialize(&bytes).unwrap();
    assert_eq!(profile.name, "Alan");
    assert_eq!(profile.age, 41);
    assert_eq!(profile.email, "");
    assert_eq!(profile.address, None);
    assert!(profile.scores.is_empty());
    assert_eq!(profile.labels, HashMap::new());
}

#[test]
fn test_version_below_minimum() {
    let writer = old_braid();
    let reader = Braid::default();
    reader.register::<v3::Profile>("Profile").unwrap();
    let bytes = writer
        .serialize(&v1::Profile {
            name: "Edsger".to_string(),
            age: 72,
        })
        .unwrap();
    let err = reader.deserialize::<v3::Profile>(&bytes).unwrap_err();
    assert!(matches!(err, Error::VersionUnsupported(_)));
}

#[test]
fn test_registered_version_overrides_declaration() {
    let writer = Braid::default();
    writer
        .register_versioned::<v1::Profile>("Profile", 5, 0)
        .unwrap();
    let bytes = writer
        .serialize(&v1::Profile {
            name: "Barbara".to_string(),
            age: 80,
        })
        .unwrap();
    let version_at = 4 + "Profile".len() + 4;
    let version = i32::from_le_bytes(bytes[version_at..version_at + 4].try_into().unwrap());
    assert_eq!(version, 5);
    // older reader of a newer version takes the tolerant path
    let profile: v1::Profile = old_braid().deserialize(&bytes).unwrap();
    assert_eq!(profile.age, 80);
}

mod shared_v2 {
    use braid::BraidObject;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(BraidObject, Debug, PartialEq)]
    pub struct Inner {
        #[braid(id = "label")]
        pub label: String,
    }

    #[derive(BraidObject, Debug)]
    #[braid(version = 2)]
    pub struct Holder {
        #[braid(id = "a")]
        pub a: Rc<Inner>,
        #[braid(id = "b")]
        pub b: Rc<Inner>,
        #[braid(id = "items")]
        pub items: Vec<Rc<Inner>>,
        #[braid(id = "tail")]
        pub tail: Option<Rc<Inner>>,
    }

    #[derive(BraidObject, Debug)]
    pub struct Node {
        #[braid(id = "value")]
        pub value: i32,
        #[braid(id = "next")]
        pub next: Option<Rc<RefCell<Node>>>,
    }

    #[derive(BraidObject, Debug)]
    #[braid(version = 2)]
    pub struct Graph {
        #[braid(id = "head")]
        pub head: Rc<RefCell<Node>>,
        #[braid(id = "size")]
        pub size: i32,
    }
}

mod shared_v1 {
    use super::shared_v2::Inner;
    use braid::BraidObject;
    use std::rc::Rc;

    #[derive(BraidObject, Debug)]
    #[braid(version = 1)]
    pub struct Holder {
        #[braid(id = "b")]
        pub b: Rc<Inner>,
        #[braid(id = "tail")]
        pub tail: Option<Rc<Inner>>,
    }

    #[derive(BraidObject, Debug)]
    #[braid(version = 1)]
    pub struct Graph {
        #[braid(id = "size")]
        pub size: i32,
    }
}

#[test]
fn test_back_reference_into_skipped_field() {
    init_logger();
    let writer = Braid::default();
    writer.register::<shared_v2::Holder>("Holder").unwrap();
    writer.register::<shared_v2::Inner>("Inner").unwrap();
    let reader = Braid::default();
    reader.register::<shared_v1::Holder>("Holder").unwrap();
    reader.register::<shared_v2::Inner>("Inner").unwrap();

    let first = Rc::new(shared_v2::Inner {
        label: "first".to_string(),
    });
    let second = Rc::new(shared_v2::Inner {
        label: "second".to_string(),
    });
    let bytes = writer
        .serialize(&shared_v2::Holder {
            a: first.clone(),
            b: first.clone(),
            items: vec![second.clone(), first],
            tail: Some(second),
        })
        .unwrap();
    let holder: shared_v1::Holder = reader.deserialize(&bytes).unwrap();
    assert_eq!(holder.b.label, "first");
    // `second` was first seen inside the skipped array
    assert_eq!(holder.tail.unwrap().label, "second");
}

#[test]
fn test_skipped_cycle_is_stepped_over() {
    let writer = Braid::default();
    writer.register::<shared_v2::Graph>("Graph").unwrap();
    writer.register::<shared_v2::Node>("Node").unwrap();
    let reader = Braid::default();
    reader.register::<shared_v1::Graph>("Graph").unwrap();
    reader.register::<shared_v2::Node>("Node").unwrap();

    let head = Rc::new(std::cell::RefCell::new(shared_v2::Node {
        value: 1,
        next: None,
    }));
    head.borrow_mut().next = Some(head.clone());
    let bytes = writer
        .serialize(&shared_v2::Graph {
            head: head.clone(),
            size: 1,
        })
        .unwrap();
    // break the cycle so the test does not leak
    head.borrow_mut().next = None;
    let graph: shared_v1::Graph = reader.deserialize(&bytes).unwrap();
    assert_eq!(graph.size, 1);
}

mod grown {
    use braid::BraidObject;

    #[derive(BraidObject, Debug, PartialEq)]
    pub struct Before {
        #[braid(id = "a")]
        pub a: i32,
        #[braid(id = "b")]
        pub b: String,
    }

    #[derive(BraidObject, Debug, PartialEq)]
    pub struct After {
        #[braid(id = "a")]
        pub a: i32,
        #[braid(id = "b")]
        pub b: String,
        #[braid(id = "c")]
        pub c: Vec<i32>,
    }

    #[derive(BraidObject, Debug, PartialEq)]
    pub struct Shrunk {
        #[braid(id = "b")]
        pub b: String,
    }
}

#[test]
fn test_field_added_without_version_bump() {
    let writer = Braid::default();
    writer.register::<grown::Before>("Sample").unwrap();
    let bytes = writer
        .serialize(&grown::Before {
            a: 7,
            b: "seven".to_string(),
        })
        .unwrap();

    let reader = Braid::default();
    reader.register::<grown::After>("Sample").unwrap();
    let after: grown::After = reader.deserialize(&bytes).unwrap();
    assert_eq!(
        after,
        grown::After {
            a: 7,
            b: "seven".to_string(),
            c: Vec::new(),
        }
    );

    let reader = Braid::default();
    reader.register::<grown::Shrunk>("Sample").unwrap();
    let shrunk: grown::Shrunk = reader.deserialize(&bytes).unwrap();
    assert_eq!(shrunk.b, "seven");
}
