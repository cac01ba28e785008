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

//! Lists and sets: `list[T]` or `set[T]`, a reference id, an Int32 length,
//! then every element as a full value.

use crate::error::Error;
use crate::meta::type_grammar;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::{BraidDefault, Serializer};
use crate::types::{ContainerKind, LookupKey};
use std::any::Any;
use std::collections::{BTreeSet, HashSet, LinkedList, VecDeque};
use std::hash::Hash;
use std::sync::Arc;

/// Type id of a container of `kind` over the given argument types.
pub fn container_type_id(kind: ContainerKind, args: &[Arc<str>]) -> Arc<str> {
    Arc::from(type_grammar::encode(kind.token(), args))
}

pub fn write_elements<'a, T, I>(len: usize, elements: I, context: &mut WriteContext) -> Result<(), Error>
where
    T: Serializer + 'a,
    I: IntoIterator<Item = &'a T>,
{
    context.enter()?;
    context.writer.write_len(len)?;
    for element in elements {
        element.braid_write(context)?;
    }
    context.leave();
    Ok(())
}

pub fn read_elements<T, C>(context: &mut ReadContext) -> Result<C, Error>
where
    T: Serializer,
    C: FromIterator<T>,
{
    context.enter()?;
    let len = context.reader.read_len()?;
    let elements = (0..len)
        .map(|_| T::braid_read(context))
        .collect::<Result<C, Error>>()?;
    context.leave();
    Ok(elements)
}

macro_rules! impl_collection_serializer {
    ($kind:expr, $collection:ident < T $(: $bound:ident $(+ $more:ident)*)? >) => {
        impl<T: Serializer $(+ $bound $(+ $more)*)?> Serializer for $collection<T> {
            fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
                write_elements(self.len(), self.iter(), context)
            }

            fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
                read_elements::<T, Self>(context)
            }

            fn braid_type_id(registry: &TypeRegistry) -> Result<Arc<str>, Error> {
                Ok(container_type_id($kind, &[registry.type_id_of::<T>()?]))
            }

            fn braid_type_id_dyn(&self, registry: &TypeRegistry) -> Result<Arc<str>, Error> {
                registry.type_id_of::<Self>()
            }

            fn braid_lookup_key() -> LookupKey {
                LookupKey::Container($kind)
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

        impl<T $(: $bound $(+ $more)*)?> BraidDefault for $collection<T> {
            fn braid_default() -> Self {
                $collection::new()
            }
        }
    };
}

impl_collection_serializer!(ContainerKind::List, VecDeque<T>);
impl_collection_serializer!(ContainerKind::List, LinkedList<T>);
impl_collection_serializer!(ContainerKind::Set, HashSet<T: Eq + Hash>);
impl_collection_serializer!(ContainerKind::Set, BTreeSet<T: Ord>);
