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
use crate::serializer::Serializer;

/// Writes the body of `value` through the bindings registered for `T`.
pub fn write_custom<T: Serializer>(value: &T, context: &mut WriteContext) -> Result<(), Error> {
    let bindings = context.registry().bindings_of::<T>()?;
    (bindings.write)(value, context)
}

pub fn read_custom<T: Serializer>(context: &mut ReadContext) -> Result<T, Error> {
    let bindings = context.registry().bindings_of::<T>()?;
    (bindings.read)(context)
}

/// Implements `Serializer` for a type encoded by hand-written bindings.
///
/// The bindings are looked up in the registry at every call, so the type must
/// be registered with `register_custom` before it is written or read.
///
/// ```rust,ignore
/// braid_core::custom_serializer!(Rgb);
///
/// registry.register_custom::<Rgb>("Rgb", 0, 0, CodecBindings {
///     write: |rgb, context| { context.writer.write_u32(rgb.0); Ok(()) },
///     read: |context| Ok(Rgb(context.reader.read_u32()?)),
///     skip: Some(|context| context.reader.skip(4)),
/// })?;
/// ```
#[macro_export]
macro_rules! custom_serializer {
    ($ty:ty) => {
        impl $crate::serializer::Serializer for $ty {
            fn braid_write_body(
                &self,
                context: &mut $crate::resolver::context::WriteContext,
            ) -> ::std::result::Result<(), $crate::error::Error> {
                $crate::serializer::custom::write_custom(self, context)
            }

            fn braid_read_body(
                context: &mut $crate::resolver::context::ReadContext,
            ) -> ::std::result::Result<Self, $crate::error::Error> {
                $crate::serializer::custom::read_custom(context)
            }

            fn braid_type_id_dyn(
                &self,
                registry: &$crate::resolver::type_registry::TypeRegistry,
            ) -> ::std::result::Result<::std::sync::Arc<str>, $crate::error::Error> {
                registry.type_id_of::<Self>()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    };
}
