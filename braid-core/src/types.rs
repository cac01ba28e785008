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

use std::any::TypeId;

/// Type token written in place of a type id for a null value.
pub const NULL: &str = "null";
/// Reserved for the end of a type section; never a user id.
pub const END_OF_TYPE: &str = "end-of-type";
pub const ARRAY: &str = "array";
pub const LIST: &str = "list";
pub const MAP: &str = "map";
pub const SET: &str = "set";
/// Marks array elements that may be null and so cannot be written raw.
pub const NULLABLE: &str = "nullable";

pub const RESERVED_TOKENS: [&str; 7] = [NULL, END_OF_TYPE, ARRAY, LIST, MAP, SET, NULLABLE];

/// Characters that only the compound type-id grammar may use.
pub const RESERVED_CHARS: [char; 6] = ['[', ']', '(', ')', '<', '>'];

/// Reference id that marks null; nothing follows it.
pub const NULL_REF: i32 = 0;
/// Id of the first tracked object in a scope.
pub const FIRST_REF: i32 = 1;

/// Empty field id closing a field loop. Encodes as `Int32(0)`.
pub const FIELD_TERMINATOR: &str = "";

pub const BOOL: &str = "bool";
pub const INT8: &str = "int8";
pub const UINT8: &str = "uint8";
pub const INT16: &str = "int16";
pub const UINT16: &str = "uint16";
pub const INT32: &str = "int32";
pub const UINT32: &str = "uint32";
pub const INT64: &str = "int64";
pub const UINT64: &str = "uint64";
pub const INT128: &str = "int128";
pub const UINT128: &str = "uint128";
pub const FLOAT32: &str = "float32";
pub const FLOAT64: &str = "float64";
pub const CHAR: &str = "char";
pub const STRING: &str = "string";
pub const TIMESTAMP: &str = "timestamp";
pub const DATE: &str = "date";
pub const DURATION: &str = "duration";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    List,
    Set,
    Map,
}

impl ContainerKind {
    pub fn token(self) -> &'static str {
        match self {
            ContainerKind::List => LIST,
            ContainerKind::Set => SET,
            ContainerKind::Map => MAP,
        }
    }

    pub fn arity(self) -> usize {
        match self {
            ContainerKind::Map => 2,
            ContainerKind::List | ContainerKind::Set => 1,
        }
    }

    pub fn from_token(token: &str) -> Option<ContainerKind> {
        match token {
            LIST => Some(ContainerKind::List),
            SET => Some(ContainerKind::Set),
            MAP => Some(ContainerKind::Map),
            _ => None,
        }
    }
}

/// Normalized registry key of a Rust type.
///
/// Enums report the key of their underlying integer, generic instantiations
/// report their open definition, and all arrays share `Array`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LookupKey {
    Type(TypeId),
    Generic(&'static str),
    Array,
    Container(ContainerKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafWidth {
    Fixed(usize),
    /// `Int32` length followed by that many bytes.
    Prefixed,
}

/// How a registered type is laid out on the wire, enough to skip it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Leaf(LeafWidth),
    Object { reference: bool },
    Custom,
}

impl TypeKind {
    pub fn is_reference(self) -> bool {
        matches!(self, TypeKind::Object { reference: true })
    }

    pub fn fixed_width(self) -> Option<usize> {
        match self {
            TypeKind::Leaf(LeafWidth::Fixed(n)) => Some(n),
            _ => None,
        }
    }
}
