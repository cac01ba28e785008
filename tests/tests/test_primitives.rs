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
use chrono::{NaiveDate, NaiveDateTime};
use std::time::Duration;
use test_helpers::{roundtrip, test_roundtrip};

#[test]
fn test_numbers() {
    let braid = Braid::default();
    test_roundtrip(&braid, true);
    test_roundtrip(&braid, -7i8);
    test_roundtrip(&braid, 200u8);
    test_roundtrip(&braid, i16::MIN);
    test_roundtrip(&braid, u16::MAX);
    test_roundtrip(&braid, -123_456i32);
    test_roundtrip(&braid, u32::MAX);
    test_roundtrip(&braid, i64::MIN);
    test_roundtrip(&braid, u64::MAX);
    test_roundtrip(&braid, i128::MAX);
    test_roundtrip(&braid, u128::MAX);
    test_roundtrip(&braid, 1.5f32);
    test_roundtrip(&braid, -0.25f64);
    test_roundtrip(&braid, 'ß');
}

#[test]
fn test_pointer_sized() {
    let braid = Braid::default();
    test_roundtrip(&braid, usize::MAX);
    test_roundtrip(&braid, isize::MIN);
    // pointer-sized integers travel as their 64-bit counterparts
    let bytes = braid.serialize(&42usize).unwrap();
    assert_eq!(braid.deserialize::<u64>(&bytes).unwrap(), 42);
}

#[test]
fn test_nan_survives() {
    let braid = Braid::default();
    let value: f64 = roundtrip(&braid, &f64::NAN);
    assert!(value.is_nan());
}

#[test]
fn test_strings() {
    let braid = Braid::default();
    test_roundtrip(&braid, String::new());
    test_roundtrip(&braid, "hello, world".to_string());
    test_roundtrip(&braid, "多字节 ✓".to_string());
}

#[test]
fn test_leaf_layout() {
    let braid = Braid::default();
    let bytes = braid.serialize(&7i32).unwrap();
    let mut expected = Vec::new();
    expected.extend_from_slice(&5i32.to_le_bytes());
    expected.extend_from_slice(b"int32");
    expected.extend_from_slice(&7i32.to_le_bytes());
    assert_eq!(bytes, expected);
}

#[test]
fn test_date_time() {
    let braid = Braid::default();
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    test_roundtrip(&braid, date);
    test_roundtrip(&braid, NaiveDate::from_ymd_opt(1812, 6, 24).unwrap());
    let time: NaiveDateTime = date.and_hms_micro_opt(23, 59, 58, 123_456).unwrap();
    test_roundtrip(&braid, time);
}

#[test]
fn test_duration() {
    let braid = Braid::default();
    test_roundtrip(&braid, Duration::ZERO);
    test_roundtrip(&braid, Duration::new(86_400 * 365, 999_999_999));
}

#[test]
fn test_trailing_bytes() {
    let braid = Braid::default();
    let mut bytes = braid.serialize(&1i32).unwrap();
    bytes.push(0);
    let err = braid.deserialize::<i32>(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}

#[test]
fn test_truncated_input() {
    let braid = Braid::default();
    let bytes = braid.serialize(&"truncated".to_string()).unwrap();
    let err = braid
        .deserialize::<String>(&bytes[..bytes.len() - 2])
        .unwrap_err();
    assert!(matches!(err, Error::BufferOutOfBound(..)));
}

#[test]
fn test_type_mismatch() {
    let braid = Braid::default();
    let bytes = braid.serialize(&1i32).unwrap();
    let err = braid.deserialize::<String>(&bytes).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn test_null_for_value_type() {
    let braid = Braid::default();
    let bytes = braid.serialize(&None::<i32>).unwrap();
    let err = braid.deserialize::<i32>(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
    assert_eq!(braid.deserialize::<Option<i32>>(&bytes).unwrap(), None);
}

#[test]
fn test_streams() {
    let braid = Braid::default();
    let mut sink = Vec::new();
    braid.serialize_to(&mut sink, &"streamed".to_string()).unwrap();
    let value: String = braid.deserialize_from(sink.as_slice()).unwrap();
    assert_eq!(value, "streamed");

    let mut buf = vec![0xff];
    braid.serialize_into(&99u16, &mut buf).unwrap();
    assert_eq!(braid.deserialize::<u16>(&buf[1..]).unwrap(), 99);
}
