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

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::shared::read_rc_data;
use crate::serializer::Serializer;
use std::any::{Any, TypeId};
use std::rc::Rc;
use std::sync::Arc;

pub type WriteErasedFn = fn(&dyn Any, &mut WriteContext) -> Result<(), Error>;
pub type ReadBoxFn = fn(&mut ReadContext) -> Result<Box<dyn Any>, Error>;
pub type ReadRcFn = fn(&mut ReadContext) -> Result<Rc<dyn Any>, Error>;

/// Type-erased codec of one concrete type.
///
/// Used wherever the concrete type is only known from a type id read off
/// the wire: trait-object slots and the non-generic entry points.
pub struct CompiledCodec {
    type_id: Arc<str>,
    rust_type: TypeId,
    rust_name: &'static str,
    reference: bool,
    write: WriteErasedFn,
    read_box: ReadBoxFn,
    read_rc: ReadRcFn,
}

fn write_erased<T: Serializer>(value: &dyn Any, context: &mut WriteContext) -> Result<(), Error> {
    let value = value.downcast_ref::<T>().ok_or_else(|| {
        Error::type_mismatch(std::any::type_name::<T>(), "a value of another type")
    })?;
    value.braid_write_data(context)
}

fn read_box<T: Serializer>(context: &mut ReadContext) -> Result<Box<dyn Any>, Error> {
    let value: Box<dyn Any> = Box::new(T::braid_read_data(context)?);
    Ok(value)
}

fn read_rc<T: Serializer>(context: &mut ReadContext) -> Result<Rc<dyn Any>, Error> {
    let value: Rc<dyn Any> = read_rc_data::<T>(context)?;
    Ok(value)
}

impl CompiledCodec {
    pub fn new<T: Serializer>(registry: &TypeRegistry) -> Result<CompiledCodec, Error> {
        Ok(CompiledCodec {
            type_id: registry.type_id_of::<T>()?,
            rust_type: TypeId::of::<T>(),
            rust_name: std::any::type_name::<T>(),
            reference: T::braid_is_reference(),
            write: write_erased::<T>,
            read_box: read_box::<T>,
            read_rc: read_rc::<T>,
        })
    }

    /// Entry point stored in a registry descriptor for lazy compilation.
    pub(crate) fn compile<T: Serializer>(registry: &TypeRegistry) -> Result<CompiledCodec, Error> {
        Self::new::<T>(registry)
    }

    pub fn wire_id(&self) -> &Arc<str> {
        &self.type_id
    }

    pub fn rust_type(&self) -> TypeId {
        self.rust_type
    }

    pub fn rust_name(&self) -> &'static str {
        self.rust_name
    }

    /// Whether values of this type carry a reference id.
    pub fn is_reference(&self) -> bool {
        self.reference
    }

    /// Writes the data after the type id.
    pub fn write_data(&self, value: &dyn Any, context: &mut WriteContext) -> Result<(), Error> {
        (self.write)(value, context)
    }

    pub fn read_box(&self, context: &mut ReadContext) -> Result<Box<dyn Any>, Error> {
        (self.read_box)(context)
    }

    pub fn read_rc(&self, context: &mut ReadContext) -> Result<Rc<dyn Any>, Error> {
        (self.read_rc)(context)
    }
}

impl std::fmt::Debug for CompiledCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledCodec")
            .field("type_id", &self.type_id)
            .field("rust_name", &self.rust_name)
            .finish()
    }
}

/// Conversion of an erased value of concrete type `from` into `To`.
pub struct Upcast<To: ?Sized> {
    pub from: TypeId,
    pub boxed: fn(Box<dyn Any>) -> Result<Box<To>, Box<dyn Any>>,
    pub shared: fn(Rc<dyn Any>) -> Result<Rc<To>, Rc<dyn Any>>,
}

impl<To: ?Sized> Clone for Upcast<To> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<To: ?Sized> Copy for Upcast<To> {}

/// The codec of a runtime type `From` serving a declared slot of type `To`.
///
/// Built lazily per `(From, To)` pair by [`TypeRegistry::adapter`].
pub struct Delegate<To: ?Sized> {
    codec: Arc<CompiledCodec>,
    upcast: Upcast<To>,
}

impl<To: ?Sized + 'static> Delegate<To> {
    pub(crate) fn new(codec: Arc<CompiledCodec>, upcast: Upcast<To>) -> Self {
        Delegate { codec, upcast }
    }

    pub fn codec(&self) -> &Arc<CompiledCodec> {
        &self.codec
    }

    pub fn read_box(&self, context: &mut ReadContext) -> Result<Box<To>, Error> {
        let value = self.codec.read_box(context)?;
        (self.upcast.boxed)(value).map_err(|_| self.mismatch())
    }

    pub fn read_rc(&self, context: &mut ReadContext) -> Result<Rc<To>, Error> {
        let value = self.codec.read_rc(context)?;
        (self.upcast.shared)(value).map_err(|_| self.mismatch())
    }

    #[cold]
    fn mismatch(&self) -> Error {
        Error::type_mismatch(std::any::type_name::<To>(), self.codec.rust_name)
    }
}
