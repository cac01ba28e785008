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


use braid::{polymorphic, Braid, BraidObject, Error, Serializer};
use std::rc::Rc;
use test_helpers::roundtrip;

trait Shape: Serializer {
    fn area(&self) -> f64;
    fn name(&self) -> &str;
}

#[derive(BraidObject, Debug, PartialEq)]
struct Circle {
    #[braid(id = "radius")]
    radius: f64,
}

#[derive(BraidObject, Debug, PartialEq)]
struct Square {
    #[braid(id = "side")]
    side: f64,
}

#[derive(BraidObject, Debug, PartialEq)]
struct Triangle {
    #[braid(id = "base")]
    base: f64,
    #[braid(id = "height")]
    height: f64,
}

impl Shape for Circle {
    fn area(&self) -> f64 {
        3.0 * self.radius * self.radius
    }

    fn name(&self) -> &str {
        "circle"
    }
}

impl Shape for Square {
    fn area(&self) -> f64 {
        self.side * self.side
    }

    fn name(&self) -> &str {
        "square"
    }
}

polymorphic!(dyn Shape => Circle, Square);

#[derive(BraidObject)]
struct Drawing {
    #[braid(id = "shapes")]
    shapes: Vec<Box<dyn Shape>>,
    #[braid(id = "focus")]
    focus: Option<Rc<dyn Shape>>,
}

fn braid() -> Braid {
    let braid = Braid::default();
    braid.register::<Circle>("Circle").unwrap();
    braid.register::<Square>("Square").unwrap();
    braid.register::<Triangle>("Triangle").unwrap();
    braid.register::<Drawing>("Drawing").unwrap();
    braid
}

#[test]
fn test_boxed_trait_objects() {
    let braid = braid();
    let shapes: Vec<Box<dyn Shape>> = vec![
        Box::new(Circle { radius: 1.0 }),
        Box::new(Square { side: 2.0 }),
    ];
    assert_eq!(
        &*braid
            .registry()
            .type_id_of::<Vec<Box<dyn Shape>>>()
            .unwrap(),
        "array[Shape]"
    );
    let result = roundtrip(&braid, &shapes);
    let names: Vec<&str> = result.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["circle", "square"]);
    assert_eq!(result[0].area(), 3.0);
    assert_eq!(result[1].area(), 4.0);
}

#[test]
fn test_runtime_type_is_written() {
    let braid = braid();
    let shape: Box<dyn Shape> = Box::new(Square { side: 1.5 });
    let bytes = braid.serialize(&shape).unwrap();
    assert_eq!(&bytes[4..4 + "Square".len()], b"Square");
    // the concrete type reads it back as well
    let square: Square = braid.deserialize(&bytes).unwrap();
    assert_eq!(square, Square { side: 1.5 });
}

#[test]
fn test_shared_trait_objects() {
    let braid = braid();
    let circle: Rc<dyn Shape> = Rc::new(Circle { radius: 2.0 });
    let shapes: Vec<Rc<dyn Shape>> = vec![circle.clone(), Rc::new(Square { side: 1.0 }), circle];
    let result = roundtrip(&braid, &shapes);
    assert_eq!(
        Rc::as_ptr(&result[0]) as *const (),
        Rc::as_ptr(&result[2]) as *const ()
    );
    assert_ne!(
        Rc::as_ptr(&result[0]) as *const (),
        Rc::as_ptr(&result[1]) as *const ()
    );
    assert_eq!(result[2].area(), 12.0);
}

#[test]
fn test_trait_object_fields() {
    let braid = braid();
    let focus: Rc<dyn Shape> = Rc::new(Circle { radius: 0.5 });
    let drawing = Drawing {
        shapes: vec![Box::new(Square { side: 3.0 })],
        focus: Some(focus),
    };
    let result = roundtrip(&braid, &drawing);
    assert_eq!(result.shapes.len(), 1);
    assert_eq!(result.shapes[0].name(), "square");
    assert_eq!(result.focus.as_ref().map(|s| s.name()), Some("circle"));

    let empty = roundtrip(
        &braid,
        &Drawing {
            shapes: vec![],
            focus: None,
        },
    );
    assert!(empty.focus.is_none());
}

#[test]
fn test_unlisted_runtime_type() {
    let braid = braid();
    let bytes = braid
        .serialize(&Triangle {
            base: 1.0,
            height: 1.0,
        })
        .unwrap();
    let err = braid.deserialize::<Box<dyn Shape>>(&bytes).err().unwrap();
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn test_unregistered_runtime_type() {
    let writer = braid();
    let reader = Braid::default();
    reader.register::<Circle>("Circle").unwrap();
    let shape: Box<dyn Shape> = Box::new(Square { side: 1.0 });
    let bytes = writer.serialize(&shape).unwrap();
    let err = reader.deserialize::<Box<dyn Shape>>(&bytes).err().unwrap();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_deserialize_dyn() {
    let braid = braid();
    let bytes = braid.serialize(&Circle { radius: 4.0 }).unwrap();
    let value = braid.deserialize_dyn(&bytes).unwrap();
    assert_eq!(value.downcast_ref::<Circle>(), Some(&Circle { radius: 4.0 }));
}
