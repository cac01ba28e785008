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

//! Interior mutability wrappers. Each writes exactly what its inner value
//! writes. Behind `Rc`/`Arc`, the reference kinds among them publish the
//! shared pointer before reading the inner fields, which is what lets
//! cyclic graphs round-trip.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::{BraidDefault, Serializer};
use crate::types::LookupKey;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{Arc, Mutex, RwLock};

macro_rules! forward_type_info {
    () => {
        fn braid_type_id(registry: &TypeRegistry) -> Result<Arc<str>, Error> {
            registry.type_id_of::<T>()
        }

        fn braid_type_id_dyn(&self, registry: &TypeRegistry) -> Result<Arc<str>, Error> {
            registry.type_id_of::<T>()
        }

        fn braid_lookup_key() -> LookupKey {
            T::braid_lookup_key()
        }

        fn braid_is_reference() -> bool {
            T::braid_is_reference()
        }

        fn braid_is_reference_dyn(&self) -> bool {
            T::braid_is_reference()
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
    };
}

impl<T: Serializer + BraidDefault> Serializer for RefCell<T> {
    fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
        let value = self
            .try_borrow()
            .map_err(|_| Error::not_allowed("value is mutably borrowed while being written"))?;
        value.braid_write_body(context)
    }

    fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
        Ok(RefCell::new(T::braid_read_body(context)?))
    }

    fn braid_read_body_into(&mut self, context: &mut ReadContext) -> Result<(), Error> {
        self.get_mut().braid_read_body_into(context)
    }

    fn braid_read_rc_body(context: &mut ReadContext, ref_id: i32) -> Result<Rc<Self>, Error> {
        let cell = Rc::new(RefCell::new(T::braid_default()));
        let erased: Rc<dyn Any> = cell.clone();
        context.ref_reader.add_rc(ref_id, erased)?;
        cell.borrow_mut().braid_read_body_into(context)?;
        Ok(cell)
    }

    forward_type_info!();
}

impl<T: BraidDefault> BraidDefault for RefCell<T> {
    fn braid_default() -> Self {
        RefCell::new(T::braid_default())
    }
}

impl<T: Serializer + Copy> Serializer for Cell<T> {
    fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
        self.get().braid_write_body(context)
    }

    fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
        Ok(Cell::new(T::braid_read_body(context)?))
    }

    forward_type_info!();
}

impl<T: BraidDefault> BraidDefault for Cell<T> {
    fn braid_default() -> Self {
        Cell::new(T::braid_default())
    }
}

impl<T: Serializer + BraidDefault + Send> Serializer for Mutex<T> {
    fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
        let value = self
            .lock()
            .map_err(|_| Error::not_allowed("mutex is poisoned"))?;
        value.braid_write_body(context)
    }

    fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
        Ok(Mutex::new(T::braid_read_body(context)?))
    }

    fn braid_read_body_into(&mut self, context: &mut ReadContext) -> Result<(), Error> {
        self.get_mut()
            .map_err(|_| Error::not_allowed("mutex is poisoned"))?
            .braid_read_body_into(context)
    }

    fn braid_read_arc_body(context: &mut ReadContext, ref_id: i32) -> Result<Arc<Self>, Error> {
        let shared = Arc::new(Mutex::new(T::braid_default()));
        let erased: Arc<dyn Any + Send + Sync> = shared.clone();
        context.ref_reader.add_arc(ref_id, erased)?;
        shared
            .lock()
            .map_err(|_| Error::not_allowed("mutex is poisoned"))?
            .braid_read_body_into(context)?;
        Ok(shared)
    }

    forward_type_info!();
}

impl<T: BraidDefault> BraidDefault for Mutex<T> {
    fn braid_default() -> Self {
        Mutex::new(T::braid_default())
    }
}

impl<T: Serializer + BraidDefault + Send + Sync> Serializer for RwLock<T> {
    fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
        let value = self
            .read()
            .map_err(|_| Error::not_allowed("lock is poisoned"))?;
        value.braid_write_body(context)
    }

    fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
        Ok(RwLock::new(T::braid_read_body(context)?))
    }

    fn braid_read_body_into(&mut self, context: &mut ReadContext) -> Result<(), Error> {
        self.get_mut()
            .map_err(|_| Error::not_allowed("lock is poisoned"))?
            .braid_read_body_into(context)
    }

    fn braid_read_arc_body(context: &mut ReadContext, ref_id: i32) -> Result<Arc<Self>, Error> {
        let shared = Arc::new(RwLock::new(T::braid_default()));
        let erased: Arc<dyn Any + Send + Sync> = shared.clone();
        context.ref_reader.add_arc(ref_id, erased)?;
        shared
            .write()
            .map_err(|_| Error::not_allowed("lock is poisoned"))?
            .braid_read_body_into(context)?;
        Ok(shared)
    }

    forward_type_info!();
}

impl<T: BraidDefault> BraidDefault for RwLock<T> {
    fn braid_default() -> Self {
        RwLock::new(T::braid_default())
    }
}
