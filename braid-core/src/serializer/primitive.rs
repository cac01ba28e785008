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
use crate::types::LookupKey;
use std::any::{Any, TypeId};
use std::mem;
use std::sync::Arc;

macro_rules! impl_leaf_serializer {
    ($ty:ty, $writer:ident, $reader:ident, $default:expr) => {
        impl Serializer for $ty {
            #[inline(always)]
            fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
                context.writer.$writer(*self);
                Ok(())
            }

            #[inline(always)]
            fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
                context.reader.$reader()
            }

            fn braid_type_id_dyn(&self, registry: &TypeRegistry) -> Result<Arc<str>, Error> {
                registry.type_id_of::<Self>()
            }

            #[inline(always)]
            fn braid_fixed_width() -> Option<usize> {
                Some(mem::size_of::<$ty>())
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        impl BraidDefault for $ty {
            #[inline(always)]
            fn braid_default() -> Self {
                $default
            }
        }
    };
}

impl_leaf_serializer!(bool, write_bool, read_bool, false);
impl_leaf_serializer!(i8, write_i8, read_i8, 0);
impl_leaf_serializer!(u8, write_u8, read_u8, 0);
impl_leaf_serializer!(i16, write_i16, read_i16, 0);
impl_leaf_serializer!(u16, write_u16, read_u16, 0);
impl_leaf_serializer!(i32, write_i32, read_i32, 0);
impl_leaf_serializer!(u32, write_u32, read_u32, 0);
impl_leaf_serializer!(i64, write_i64, read_i64, 0);
impl_leaf_serializer!(u64, write_u64, read_u64, 0);
impl_leaf_serializer!(i128, write_i128, read_i128, 0);
impl_leaf_serializer!(u128, write_u128, read_u128, 0);
impl_leaf_serializer!(f32, write_f32, read_f32, 0.0);
impl_leaf_serializer!(f64, write_f64, read_f64, 0.0);
impl_leaf_serializer!(char, write_char, read_char, '\0');

// Pointer-sized integers travel as their 64-bit counterparts.
macro_rules! impl_pointer_sized_serializer {
    ($ty:ty, $wide:ty, $writer:ident, $reader:ident) => {
        impl Serializer for $ty {
            #[inline(always)]
            fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
                context.writer.$writer(*self as $wide);
                Ok(())
            }

            fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
                let wide = context.reader.$reader()?;
                <$ty>::try_from(wide).map_err(|_| {
                    Error::invalid_data(format!(
                        "{wide} does not fit in {}",
                        stringify!($ty)
                    ))
                })
            }

            fn braid_type_id_dyn(&self, registry: &TypeRegistry) -> Result<Arc<str>, Error> {
                registry.type_id_of::<Self>()
            }

            fn braid_lookup_key() -> LookupKey {
                LookupKey::Type(TypeId::of::<$wide>())
            }

            #[inline(always)]
            fn braid_fixed_width() -> Option<usize> {
                Some(mem::size_of::<$wide>())
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        impl BraidDefault for $ty {
            fn braid_default() -> Self {
                0
            }
        }
    };
}

impl_pointer_sized_serializer!(usize, u64, write_u64, read_u64);
impl_pointer_sized_serializer!(isize, i64, write_i64, read_i64);

impl Serializer for String {
    fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.writer.write_string(self)
    }

    fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
        Ok(context.reader.read_str()?.to_string())
    }

    fn braid_type_id_dyn(&self, registry: &TypeRegistry) -> Result<Arc<str>, Error> {
        registry.type_id_of::<Self>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl BraidDefault for String {
    fn braid_default() -> Self {
        String::new()
    }
}
