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

//! Shared and boxed pointers.
//!
//! `Rc<T>` and `Arc<T>` of a reference kind are tracked by allocation
//! address: the first occurrence writes the body under a new reference id,
//! later occurrences write the id alone. Pointers to value kinds are written
//! as the value itself.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::polymorphic::Covariant;
use crate::serializer::{BraidDefault, Serializer};
use crate::types::LookupKey;
use std::any::Any;
use std::rc::Rc;
use std::sync::Arc;

/// Reads the data of an `Rc<T>`, resolving back-references.
pub fn read_rc_data<T: Serializer>(context: &mut ReadContext) -> Result<Rc<T>, Error> {
    if !T::braid_is_reference() {
        return Ok(Rc::new(T::braid_read_data(context)?));
    }
    let ref_id = context.read_ref_id()?;
    if let Some(existing) = context.ref_reader.try_get_rc(ref_id)? {
        return existing.downcast::<T>().map_err(|_| {
            Error::type_mismatch(std::any::type_name::<T>(), "a shared value of another type")
        });
    }
    T::braid_read_rc_body(context, ref_id)
}

pub fn read_arc_data<T: Serializer + Send + Sync>(context: &mut ReadContext) -> Result<Arc<T>, Error> {
    if !T::braid_is_reference() {
        return Ok(Arc::new(T::braid_read_data(context)?));
    }
    let ref_id = context.read_ref_id()?;
    if let Some(existing) = context.ref_reader.try_get_arc(ref_id)? {
        return existing.downcast::<T>().map_err(|_| {
            Error::type_mismatch(std::any::type_name::<T>(), "a shared value of another type")
        });
    }
    T::braid_read_arc_body(context, ref_id)
}

/// Writes the reference id of a shared value and, on its first occurrence, its body.
fn write_shared<T: ?Sized + Serializer>(
    value: &T,
    address: usize,
    context: &mut WriteContext,
) -> Result<(), Error> {
    if !value.braid_is_reference_dyn() {
        return value.braid_write_body(context);
    }
    let (ref_id, created) = context.ref_writer.get_or_create_id(Some(address));
    context.writer.write_i32(ref_id);
    if created {
        value.braid_write_body(context)?;
    }
    Ok(())
}

impl<T: ?Sized + Covariant> Serializer for Rc<T> {
    fn braid_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        let address = Rc::as_ptr(self) as *const () as usize;
        write_shared(&**self, address, context)
    }

    fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
        (**self).braid_write_body(context)
    }

    fn braid_read_with_type_id(context: &mut ReadContext, type_id: &str) -> Result<Self, Error> {
        T::braid_read_shared(context, type_id)
    }

    fn braid_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        T::braid_read_shared_data(context)
    }

    fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
        Ok(Rc::from(T::braid_read_boxed_body(context)?))
    }

    fn braid_type_id(registry: &TypeRegistry) -> Result<Arc<str>, Error> {
        T::braid_declared_type_id(registry)
    }

    fn braid_type_id_dyn(&self, registry: &TypeRegistry) -> Result<Arc<str>, Error> {
        (**self).braid_type_id_dyn(registry)
    }

    fn braid_lookup_key() -> LookupKey {
        T::braid_declared_lookup_key()
    }

    fn braid_is_reference() -> bool {
        T::braid_declared_is_reference()
    }

    fn braid_is_reference_dyn(&self) -> bool {
        (**self).braid_is_reference_dyn()
    }

    fn braid_fixed_width() -> Option<usize> {
        T::braid_declared_fixed_width()
    }

    fn braid_is_transparent() -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: BraidDefault> BraidDefault for Rc<T> {
    fn braid_default() -> Self {
        Rc::new(T::braid_default())
    }
}

impl<T: Serializer + Send + Sync> Serializer for Arc<T> {
    fn braid_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        let address = Arc::as_ptr(self) as *const () as usize;
        write_shared(&**self, address, context)
    }

    fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
        (**self).braid_write_body(context)
    }

    fn braid_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        read_arc_data::<T>(context)
    }

    fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
        Ok(Arc::new(T::braid_read_body(context)?))
    }

    fn braid_type_id(registry: &TypeRegistry) -> Result<Arc<str>, Error> {
        registry.type_id_of::<T>()
    }

    fn braid_type_id_dyn(&self, registry: &TypeRegistry) -> Result<Arc<str>, Error> {
        (**self).braid_type_id_dyn(registry)
    }

    fn braid_lookup_key() -> LookupKey {
        T::braid_lookup_key()
    }

    fn braid_is_reference() -> bool {
        T::braid_is_reference()
    }

    fn braid_is_reference_dyn(&self) -> bool {
        (**self).braid_is_reference_dyn()
    }

    fn braid_fixed_width() -> Option<usize> {
        T::braid_fixed_width()
    }

    fn braid_is_transparent() -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: BraidDefault> BraidDefault for Arc<T> {
    fn braid_default() -> Self {
        Arc::new(T::braid_default())
    }
}

// A box owns its value, so it writes exactly what the value writes.
impl<T: ?Sized + Covariant> Serializer for Box<T> {
    fn braid_write(&self, context: &mut WriteContext) -> Result<(), Error> {
        (**self).braid_write(context)
    }

    fn braid_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        (**self).braid_write_data(context)
    }

    fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
        (**self).braid_write_body(context)
    }

    fn braid_read_with_type_id(context: &mut ReadContext, type_id: &str) -> Result<Self, Error> {
        T::braid_read_boxed(context, type_id)
    }

    fn braid_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        T::braid_read_boxed_data(context)
    }

    fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
        T::braid_read_boxed_body(context)
    }

    fn braid_type_id(registry: &TypeRegistry) -> Result<Arc<str>, Error> {
        T::braid_declared_type_id(registry)
    }

    fn braid_type_id_dyn(&self, registry: &TypeRegistry) -> Result<Arc<str>, Error> {
        (**self).braid_type_id_dyn(registry)
    }

    fn braid_lookup_key() -> LookupKey {
        T::braid_declared_lookup_key()
    }

    fn braid_is_reference() -> bool {
        T::braid_declared_is_reference()
    }

    fn braid_is_reference_dyn(&self) -> bool {
        (**self).braid_is_reference_dyn()
    }

    fn braid_fixed_width() -> Option<usize> {
        T::braid_declared_fixed_width()
    }

    fn braid_is_transparent() -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: BraidDefault> BraidDefault for Box<T> {
    fn braid_default() -> Self {
        Box::new(T::braid_default())
    }
}
