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

//! Declared slot types that may hold a value of another runtime type.
//!
//! Writes always dispatch on the runtime value, so `Box<dyn Shape>` writes
//! the type id of the concrete shape. Reads resolve the concrete codec from
//! the type id in the stream and convert its result to the declared type
//! through a [`Delegate`](crate::resolver::codec::Delegate).
//!
//! ```rust,ignore
//! use braid_core::serializer::Serializer;
//!
//! pub trait Shape: Serializer {
//!     fn area(&self) -> f64;
//! }
//!
//! braid_core::polymorphic!(dyn Shape => Circle, Square);
//! ```

use crate::error::Error;
use crate::resolver::codec::Upcast;
use crate::resolver::context::ReadContext;
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::shared::read_rc_data;
use crate::serializer::Serializer;
use crate::types::LookupKey;
use std::any::TypeId;
use std::rc::Rc;
use std::sync::Arc;

/// A type usable as the target of `Box<T>` and `Rc<T>` slots.
pub trait Covariant: Serializer {
    /// Type id of the declared slot type.
    fn braid_declared_type_id(registry: &TypeRegistry) -> Result<Arc<str>, Error>;

    fn braid_declared_lookup_key() -> LookupKey;

    fn braid_declared_is_reference() -> bool;

    fn braid_declared_fixed_width() -> Option<usize>;

    /// Reads a value whose runtime type id was already consumed.
    fn braid_read_boxed(context: &mut ReadContext, type_id: &str) -> Result<Box<Self>, Error>;

    fn braid_read_boxed_data(context: &mut ReadContext) -> Result<Box<Self>, Error>;

    fn braid_read_boxed_body(context: &mut ReadContext) -> Result<Box<Self>, Error>;

    /// Like [`Covariant::braid_read_boxed`], resolving back-references.
    fn braid_read_shared(context: &mut ReadContext, type_id: &str) -> Result<Rc<Self>, Error>;

    fn braid_read_shared_data(context: &mut ReadContext) -> Result<Rc<Self>, Error>;

    /// Conversions from every runtime type this slot accepts.
    fn braid_upcasts() -> Vec<Upcast<Self>>;
}

impl<T: Serializer> Covariant for T {
    fn braid_declared_type_id(registry: &TypeRegistry) -> Result<Arc<str>, Error> {
        registry.type_id_of::<T>()
    }

    fn braid_declared_lookup_key() -> LookupKey {
        T::braid_lookup_key()
    }

    fn braid_declared_is_reference() -> bool {
        T::braid_is_reference()
    }

    fn braid_declared_fixed_width() -> Option<usize> {
        T::braid_fixed_width()
    }

    fn braid_read_boxed(context: &mut ReadContext, type_id: &str) -> Result<Box<Self>, Error> {
        Ok(Box::new(T::braid_read_with_type_id(context, type_id)?))
    }

    fn braid_read_boxed_data(context: &mut ReadContext) -> Result<Box<Self>, Error> {
        Ok(Box::new(T::braid_read_data(context)?))
    }

    fn braid_read_boxed_body(context: &mut ReadContext) -> Result<Box<Self>, Error> {
        Ok(Box::new(T::braid_read_body(context)?))
    }

    fn braid_read_shared(context: &mut ReadContext, type_id: &str) -> Result<Rc<Self>, Error> {
        context.expect_type_id::<T>(type_id)?;
        read_rc_data::<T>(context)
    }

    fn braid_read_shared_data(context: &mut ReadContext) -> Result<Rc<Self>, Error> {
        read_rc_data::<T>(context)
    }

    fn braid_upcasts() -> Vec<Upcast<Self>> {
        vec![Upcast {
            from: TypeId::of::<T>(),
            boxed: |value| value.downcast::<T>(),
            shared: |value| value.downcast::<T>(),
        }]
    }
}

/// Error for reads of a trait-object slot without a type id to dispatch on.
#[cold]
pub fn missing_runtime_type(declared: &'static str) -> Error {
    Error::unsupported(format!(
        "`{declared}` can only be read through its runtime type id"
    ))
}

/// Makes `Box<dyn Trait>` and `Rc<dyn Trait>` serializable.
///
/// The trait must have `Serializer` as a supertrait. Every listed type is an
/// accepted runtime type of the slot and must be registered before reading.
#[macro_export]
macro_rules! polymorphic {
    (dyn $tr:ident => $($ty:ty),+ $(,)?) => {
        impl $crate::serializer::polymorphic::Covariant for dyn $tr {
            fn braid_declared_type_id(
                _registry: &$crate::resolver::type_registry::TypeRegistry,
            ) -> ::std::result::Result<::std::sync::Arc<str>, $crate::error::Error> {
                ::std::result::Result::Ok(::std::sync::Arc::from(stringify!($tr)))
            }

            fn braid_declared_lookup_key() -> $crate::types::LookupKey {
                $crate::types::LookupKey::Type(::std::any::TypeId::of::<dyn $tr>())
            }

            fn braid_declared_is_reference() -> bool {
                true
            }

            fn braid_declared_fixed_width() -> ::std::option::Option<usize> {
                ::std::option::Option::None
            }

            fn braid_read_boxed(
                context: &mut $crate::resolver::context::ReadContext,
                type_id: &str,
            ) -> ::std::result::Result<::std::boxed::Box<Self>, $crate::error::Error> {
                if type_id == $crate::types::NULL {
                    return ::std::result::Result::Err($crate::error::Error::invalid_data(
                        concat!("unexpected null for non-nullable `dyn ", stringify!($tr), "`"),
                    ));
                }
                let registry = context.registry();
                let codec = registry.codec_by_id(type_id)?;
                registry.adapter::<dyn $tr>(&codec)?.read_box(context)
            }

            fn braid_read_boxed_data(
                _context: &mut $crate::resolver::context::ReadContext,
            ) -> ::std::result::Result<::std::boxed::Box<Self>, $crate::error::Error> {
                ::std::result::Result::Err($crate::serializer::polymorphic::missing_runtime_type(
                    concat!("dyn ", stringify!($tr)),
                ))
            }

            fn braid_read_boxed_body(
                _context: &mut $crate::resolver::context::ReadContext,
            ) -> ::std::result::Result<::std::boxed::Box<Self>, $crate::error::Error> {
                ::std::result::Result::Err($crate::serializer::polymorphic::missing_runtime_type(
                    concat!("dyn ", stringify!($tr)),
                ))
            }

            fn braid_read_shared(
                context: &mut $crate::resolver::context::ReadContext,
                type_id: &str,
            ) -> ::std::result::Result<::std::rc::Rc<Self>, $crate::error::Error> {
                if type_id == $crate::types::NULL {
                    return ::std::result::Result::Err($crate::error::Error::invalid_data(
                        concat!("unexpected null for non-nullable `dyn ", stringify!($tr), "`"),
                    ));
                }
                let registry = context.registry();
                let codec = registry.codec_by_id(type_id)?;
                registry.adapter::<dyn $tr>(&codec)?.read_rc(context)
            }

            fn braid_read_shared_data(
                _context: &mut $crate::resolver::context::ReadContext,
            ) -> ::std::result::Result<::std::rc::Rc<Self>, $crate::error::Error> {
                ::std::result::Result::Err($crate::serializer::polymorphic::missing_runtime_type(
                    concat!("dyn ", stringify!($tr)),
                ))
            }

            fn braid_upcasts() -> ::std::vec::Vec<$crate::resolver::codec::Upcast<Self>> {
                ::std::vec![$(
                    $crate::resolver::codec::Upcast {
                        from: ::std::any::TypeId::of::<$ty>(),
                        boxed: |value: ::std::boxed::Box<dyn ::std::any::Any>| {
                            let value: ::std::boxed::Box<dyn $tr> = value.downcast::<$ty>()?;
                            ::std::result::Result::Ok(value)
                        },
                        shared: |value: ::std::rc::Rc<dyn ::std::any::Any>| {
                            let value: ::std::rc::Rc<dyn $tr> = value.downcast::<$ty>()?;
                            ::std::result::Result::Ok(value)
                        },
                    }
                ),+]
            }
        }
    };
}
