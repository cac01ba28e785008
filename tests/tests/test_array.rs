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


use braid::{Braid, BraidObject, Error, ReadContext, Serializer, TypeRegistry, WriteContext};
use braid_core::serializer::array::{array_type_id, read_items, write_array_body, ArrayLike};
use braid_core::types::LookupKey;
use std::any::Any;
use std::sync::Arc;
use test_helpers::{roundtrip, test_roundtrip};

#[test]
fn test_empty_array() {
    let braid = Braid::default();
    test_roundtrip(&braid, Vec::<i32>::new());
    test_roundtrip(&braid, Vec::<String>::new());
}

#[test]
fn test_fast_path_is_compact() {
    let fast = Braid::default();
    let slow = Braid::default().value_array_fast_path(false);
    let values: Vec<i64> = (0..16).collect();
    let fast_bytes = fast.serialize(&values).unwrap();
    let slow_bytes = slow.serialize(&values).unwrap();
    // each element pays for its own type id on the slow path
    assert_eq!(slow_bytes.len() - fast_bytes.len(), 16 * (4 + "int64".len()));
    assert_eq!(fast.deserialize::<Vec<i64>>(&fast_bytes).unwrap(), values);
    assert_eq!(slow.deserialize::<Vec<i64>>(&slow_bytes).unwrap(), values);
}

#[test]
fn test_fast_path_types() {
    let braid = Braid::default();
    test_roundtrip(&braid, vec![true, false, true]);
    test_roundtrip(&braid, vec![1u8, 2, 255]);
    test_roundtrip(&braid, vec![-1.5f32, 0.0, 3.25]);
    test_roundtrip(&braid, vec!['a', 'é', '字']);
    test_roundtrip(&braid, vec![std::time::Duration::from_millis(1500)]);
}

#[test]
fn test_strings_are_per_element() {
    let braid = Braid::default();
    test_roundtrip(
        &braid,
        vec!["a".to_string(), String::new(), "ccc".to_string()],
    );
}

#[test]
fn test_nested_arrays() {
    let braid = Braid::default();
    let value = vec![vec![1u16, 2], vec![], vec![3]];
    assert_eq!(
        &*braid.registry().type_id_of::<Vec<Vec<u16>>>().unwrap(),
        "array[array[uint16]]"
    );
    test_roundtrip(&braid, value);
}

#[test]
fn test_fixed_size_arrays() {
    let braid = Braid::default();
    test_roundtrip(&braid, [1i32, 2, 3]);
    test_roundtrip(&braid, [[0u8; 2]; 2]);
    // the length lives on the wire, not in the id
    let bytes = braid.serialize(&vec![1i32, 2]).unwrap();
    let err = braid.deserialize::<[i32; 3]>(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}

#[test]
fn test_boxed_slice() {
    let braid = Braid::default();
    let value: Box<[String]> = vec!["x".to_string(), "y".to_string()].into_boxed_slice();
    test_roundtrip(&braid, value);
    let bytes = braid.serialize(&vec![7u32]).unwrap();
    let boxed: Box<[u32]> = braid.deserialize(&bytes).unwrap();
    assert_eq!(&*boxed, &[7]);
}

#[test]
fn test_option_elements() {
    let fast = Braid::default();
    let slow = Braid::default().value_array_fast_path(false);
    let values = vec![Some(1i32), None, Some(3)];
    test_roundtrip(&fast, values.clone());
    test_roundtrip(&slow, values.clone());
    // nullable elements never take the raw layout, so both settings agree
    assert_eq!(fast.serialize(&values).unwrap(), slow.serialize(&values).unwrap());
    assert_eq!(
        &*fast.registry().type_id_of::<Vec<Option<i32>>>().unwrap(),
        "array[nullable[int32]]"
    );
    assert_eq!(
        &*fast.registry().type_id_of::<Vec<Option<String>>>().unwrap(),
        "array[string]"
    );
}

#[derive(BraidObject, Debug, PartialEq)]
#[braid(version = 2)]
struct ReadingsV2 {
    #[braid(id = "label")]
    label: String,
    #[braid(id = "samples")]
    samples: Vec<Option<f64>>,
}

#[derive(BraidObject, Debug, PartialEq)]
#[braid(version = 1)]
struct ReadingsV1 {
    #[braid(id = "label")]
    label: String,
}

#[test]
fn test_skip_nullable_elements() {
    let writer = Braid::default();
    writer.register::<ReadingsV2>("Readings").unwrap();
    let reader = Braid::default();
    reader.register::<ReadingsV1>("Readings").unwrap();
    let bytes = writer
        .serialize(&ReadingsV2 {
            label: "sensor-a".to_string(),
            samples: vec![Some(0.5), None, Some(2.0)],
        })
        .unwrap();
    let decoded: ReadingsV1 = reader.deserialize(&bytes).unwrap();
    assert_eq!(decoded.label, "sensor-a");
}

#[derive(BraidObject, Debug, PartialEq)]
struct Sample {
    #[braid(id = "points")]
    points: Vec<f64>,
    #[braid(id = "names")]
    names: Vec<String>,
}

#[test]
fn test_arrays_in_objects() {
    let braid = Braid::default();
    braid.register::<Sample>("Sample").unwrap();
    test_roundtrip(
        &braid,
        Sample {
            points: vec![0.5, 1.5],
            names: vec!["p".to_string()],
        },
    );
    test_roundtrip(
        &braid,
        vec![Sample {
            points: vec![],
            names: vec![],
        }],
    );
}

/// An array whose first index is configurable.
#[derive(Debug, PartialEq)]
struct OffsetArray {
    start: i64,
    items: Vec<i32>,
}

impl ArrayLike for OffsetArray {
    type Item = i32;

    fn lower_bound(&self) -> i64 {
        self.start
    }

    fn items(&self) -> &[i32] {
        &self.items
    }
}

/// A rectangular array stored row by row.
#[derive(Debug, PartialEq)]
struct Grid {
    cells: Vec<i32>,
}

impl ArrayLike for Grid {
    type Item = i32;

    fn rank(&self) -> usize {
        2
    }

    fn items(&self) -> &[i32] {
        &self.cells
    }
}

macro_rules! array_serializer {
    ($ty:ident) => {
        impl Serializer for $ty {
            fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
                write_array_body(self, context)
            }

            fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
                Ok($ty::from_items(read_items(context)?))
            }

            fn braid_type_id(registry: &TypeRegistry) -> Result<Arc<str>, Error> {
                array_type_id::<i32>(registry)
            }

            fn braid_type_id_dyn(&self, registry: &TypeRegistry) -> Result<Arc<str>, Error> {
                registry.type_id_of::<Self>()
            }

            fn braid_lookup_key() -> LookupKey {
                LookupKey::Array
            }

            fn braid_is_reference() -> bool {
                true
            }

            fn braid_is_reference_dyn(&self) -> bool {
                true
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

impl OffsetArray {
    fn from_items(items: Vec<i32>) -> Self {
        OffsetArray { start: 0, items }
    }
}

impl Grid {
    fn from_items(cells: Vec<i32>) -> Self {
        Grid { cells }
    }
}

array_serializer!(OffsetArray);
array_serializer!(Grid);

#[test]
fn test_zero_based_custom_array() {
    let braid = Braid::default();
    let array = OffsetArray {
        start: 0,
        items: vec![4, 5, 6],
    };
    let result = roundtrip(&braid, &array);
    assert_eq!(result, array);
    // same wire form as a plain vector
    let bytes = braid.serialize(&array).unwrap();
    assert_eq!(braid.deserialize::<Vec<i32>>(&bytes).unwrap(), vec![4, 5, 6]);
}

#[test]
fn test_non_zero_lower_bound() {
    let braid = Braid::default();
    let err = braid
        .serialize(&OffsetArray {
            start: 1,
            items: vec![1],
        })
        .unwrap_err();
    assert!(matches!(err, Error::NonZeroLowerBound(1)));
}

#[test]
fn test_multi_dimensional() {
    let braid = Braid::default();
    let err = braid
        .serialize(&Grid {
            cells: vec![1, 2, 3, 4],
        })
        .unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));
}
