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

//! Arrays: `array[elem]`, a reference id, an Int32 length, then the elements.
//!
//! With the value-array fast path on, elements of a fixed-width type are
//! written as their raw bodies. Otherwise every element is a full value with
//! its own type id.

use crate::error::Error;
use crate::meta::type_grammar;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::{BraidDefault, Serializer};
use crate::types::{LookupKey, ARRAY, NULLABLE};
use std::any::Any;
use std::sync::Arc;

/// A contiguous sequence that encodes as an array.
///
/// Only rank 1 arrays with a zero lower bound have a wire form. Types that
/// model other shapes report them here and fail at write time.
pub trait ArrayLike {
    type Item: Serializer;

    fn rank(&self) -> usize {
        1
    }

    fn lower_bound(&self) -> i64 {
        0
    }

    fn items(&self) -> &[Self::Item];
}

impl<T: Serializer> ArrayLike for [T] {
    type Item = T;

    fn items(&self) -> &[T] {
        self
    }
}

impl<T: Serializer> ArrayLike for Vec<T> {
    type Item = T;

    fn items(&self) -> &[T] {
        self
    }
}

impl<T: Serializer, const N: usize> ArrayLike for [T; N] {
    type Item = T;

    fn items(&self) -> &[T] {
        self
    }
}

/// Type id of an array of `T`.
///
/// Elements that share the id of a fixed-width leaf but may be null, such as
/// `Option<i32>`, are written one by one and carry `nullable[..]` so the
/// layout still follows from the id.
pub fn array_type_id<T: Serializer>(registry: &TypeRegistry) -> Result<Arc<str>, Error> {
    let element = registry.type_id_of::<T>()?;
    if T::braid_fixed_width().is_none() && names_fixed_width_leaf(registry, &element) {
        let nullable = type_grammar::encode(NULLABLE, &[element]);
        return Ok(Arc::from(type_grammar::encode(ARRAY, &[nullable])));
    }
    Ok(Arc::from(type_grammar::encode(ARRAY, &[element])))
}

fn names_fixed_width_leaf(registry: &TypeRegistry, element: &str) -> bool {
    registry
        .resolve_by_id(element)
        .is_ok_and(|descriptor| descriptor.kind().fixed_width().is_some())
}

#[inline(always)]
fn use_fast_path<T: Serializer>(fast_path_enabled: bool) -> bool {
    fast_path_enabled && T::braid_fixed_width().is_some()
}

/// Writes the body of an array after checking its shape.
pub fn write_array_body<A: ArrayLike + ?Sized>(
    array: &A,
    context: &mut WriteContext,
) -> Result<(), Error> {
    let rank = array.rank();
    if rank != 1 {
        return Err(Error::unsupported(format!(
            "arrays of rank {rank} have no wire form"
        )));
    }
    let lower_bound = array.lower_bound();
    if lower_bound != 0 {
        return Err(Error::non_zero_lower_bound(lower_bound));
    }
    write_items(array.items(), context)
}

pub fn write_items<T: Serializer>(items: &[T], context: &mut WriteContext) -> Result<(), Error> {
    context.enter()?;
    context.writer.write_len(items.len())?;
    if use_fast_path::<T>(context.config().is_value_array_fast_path()) {
        if let Some(width) = T::braid_fixed_width() {
            context.writer.reserve(width.saturating_mul(items.len()));
        }
        for item in items {
            item.braid_write_body(context)?;
        }
    } else {
        for item in items {
            item.braid_write(context)?;
        }
    }
    context.leave();
    Ok(())
}

pub fn read_items<T: Serializer>(context: &mut ReadContext) -> Result<Vec<T>, Error> {
    context.enter()?;
    let len = context.reader.read_len()?;
    // a corrupt length must not allocate more than the input can hold
    let mut items = Vec::with_capacity(len.min(context.reader.remaining()));
    if use_fast_path::<T>(context.config().is_value_array_fast_path()) {
        for _ in 0..len {
            items.push(T::braid_read_body(context)?);
        }
    } else {
        for _ in 0..len {
            items.push(T::braid_read(context)?);
        }
    }
    context.leave();
    Ok(items)
}

impl<T: Serializer> Serializer for Vec<T> {
    fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_array_body(self, context)
    }

    fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
        read_items(context)
    }

    fn braid_type_id(registry: &TypeRegistry) -> Result<Arc<str>, Error> {
        array_type_id::<T>(registry)
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

impl<T> BraidDefault for Vec<T> {
    fn braid_default() -> Self {
        Vec::new()
    }
}

impl<T: Serializer, const N: usize> Serializer for [T; N] {
    fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_array_body(self, context)
    }

    fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
        let items = read_items::<T>(context)?;
        let len = items.len();
        items.try_into().map_err(|_| {
            Error::invalid_data(format!("expected an array of {N} elements, found {len}"))
        })
    }

    fn braid_type_id(registry: &TypeRegistry) -> Result<Arc<str>, Error> {
        array_type_id::<T>(registry)
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

impl<T: BraidDefault, const N: usize> BraidDefault for [T; N] {
    fn braid_default() -> Self {
        std::array::from_fn(|_| T::braid_default())
    }
}

impl<T: Serializer> Serializer for Box<[T]> {
    fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_array_body(&**self, context)
    }

    fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
        Ok(read_items::<T>(context)?.into_boxed_slice())
    }

    fn braid_type_id(registry: &TypeRegistry) -> Result<Arc<str>, Error> {
        array_type_id::<T>(registry)
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

impl<T> BraidDefault for Box<[T]> {
    fn braid_default() -> Self {
        Vec::new().into_boxed_slice()
    }
}
