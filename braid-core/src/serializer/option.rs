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
use crate::serializer::{BraidDefault, Serializer};
use crate::types::{LookupKey, NULL};
use std::any::Any;
use std::sync::Arc;

// `None` is the null token and reference id 0. `Some` is the inner value
// unchanged, so `Option<T>` shares the type id of `T`.
impl<T: Serializer> Serializer for Option<T> {
    fn braid_write(&self, context: &mut WriteContext) -> Result<(), Error> {
        match self {
            Some(value) => value.braid_write(context),
            None => context.write_null(),
        }
    }

    fn braid_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        match self {
            Some(value) => value.braid_write_data(context),
            None => {
                let (ref_id, _) = context.ref_writer.get_or_create_id(None);
                context.writer.write_i32(ref_id);
                Ok(())
            }
        }
    }

    fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
        match self {
            Some(value) => value.braid_write_body(context),
            None => Err(Error::invalid_data("a null value has no body")),
        }
    }

    fn braid_read_with_type_id(context: &mut ReadContext, type_id: &str) -> Result<Self, Error> {
        if type_id == NULL {
            context.read_null_ref()?;
            return Ok(None);
        }
        Ok(Some(T::braid_read_with_type_id(context, type_id)?))
    }

    fn braid_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        Ok(Some(T::braid_read_data(context)?))
    }

    fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
        Ok(Some(T::braid_read_body(context)?))
    }

    fn braid_type_id(registry: &TypeRegistry) -> Result<Arc<str>, Error> {
        registry.type_id_of::<T>()
    }

    fn braid_type_id_dyn(&self, registry: &TypeRegistry) -> Result<Arc<str>, Error> {
        match self {
            Some(value) => value.braid_type_id_dyn(registry),
            None => Ok(Arc::from(NULL)),
        }
    }

    fn braid_lookup_key() -> LookupKey {
        T::braid_lookup_key()
    }

    fn braid_is_reference() -> bool {
        T::braid_is_reference()
    }

    fn braid_is_reference_dyn(&self) -> bool {
        self.as_ref().is_some_and(|value| value.braid_is_reference_dyn())
    }

    fn braid_is_transparent() -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T> BraidDefault for Option<T> {
    fn braid_default() -> Self {
        None
    }
}
