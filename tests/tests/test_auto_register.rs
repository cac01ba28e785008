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

#[derive(BraidObject, Debug, PartialEq)]
#[braid(type_id = "demo.Point")]
struct Point {
    #[braid(id = "x")]
    x: i32,
    #[braid(id = "y")]
    y: i32,
}

#[derive(BraidObject, Debug, PartialEq)]
#[braid(type_id = "demo.Segment", version = 3, min_version = 2)]
struct Segment {
    #[braid(id = "from")]
    from: Point,
    #[braid(id = "to")]
    to: Point,
}

#[derive(BraidObject, Debug, PartialEq)]
struct Undeclared {
    #[braid(id = "v")]
    v: i32,
}

fn segment() -> Segment {
    Segment {
        from: Point { x: 0, y: 0 },
        to: Point { x: 3, y: 4 },
    }
}

#[test]
fn test_scan_registers_declared_types() {
    let braid = Braid::default();
    assert_eq!(braid.scan().unwrap(), 2);
    let registry = braid.registry();
    assert_eq!(&*registry.type_id_of::<Point>().unwrap(), "demo.Point");
    let descriptor = registry.resolve_by_id("demo.Segment").unwrap();
    assert_eq!(descriptor.version(), 3);
    assert_eq!(descriptor.min_supported_version(), 2);
    assert!(!registry.is_registered::<Undeclared>());

    let bytes = braid.serialize(&segment()).unwrap();
    assert_eq!(braid.deserialize::<Segment>(&bytes).unwrap(), segment());
}

#[test]
fn test_scan_twice() {
    let braid = Braid::default();
    braid.scan().unwrap();
    let err = braid.scan().unwrap_err();
    assert!(matches!(err, Error::DuplicateType(_)));
}

#[test]
fn test_register_declared() {
    let braid = Braid::default();
    braid.register_declared::<Point>().unwrap();
    assert!(braid.registry().is_registered::<Point>());
    let err = braid.register_declared::<Undeclared>().unwrap_err();
    assert!(matches!(err, Error::NotAllowed(_)));
}

#[test]
fn test_global_instance() {
    let braid = braid::global().unwrap();
    assert!(std::ptr::eq(braid, Braid::global().unwrap()));
    let bytes = braid.serialize(&segment()).unwrap();
    assert_eq!(braid.deserialize::<Segment>(&bytes).unwrap(), segment());
}
