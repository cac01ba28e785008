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
use crate::serializer::collection::container_type_id;
use crate::serializer::{BraidDefault, Serializer};
use crate::types::{ContainerKind, LookupKey};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::Arc;

fn write_entries<'a, K, V, I>(len: usize, entries: I, context: &mut WriteContext) -> Result<(), Error>
where
    K: Serializer + 'a,
    V: Serializer + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    context.enter()?;
    context.writer.write_len(len)?;
    for (key, value) in entries {
        key.braid_write(context)?;
        value.braid_write(context)?;
    }
    context.leave();
    Ok(())
}

fn read_entries<K, V, M>(context: &mut ReadContext) -> Result<M, Error>
where
    K: Serializer,
    V: Serializer,
    M: FromIterator<(K, V)>,
{
    context.enter()?;
    let len = context.reader.read_len()?;
    let entries = (0..len)
        .map(|_| {
            let key = K::braid_read(context)?;
            let value = V::braid_read(context)?;
            Ok((key, value))
        })
        .collect::<Result<M, Error>>()?;
    context.leave();
    Ok(entries)
}

macro_rules! impl_map_serializer {
    ($map:ident, $($key_bound:tt)+) => {
        impl<K: Serializer + $($key_bound)+, V: Serializer> Serializer for $map<K, V> {
            fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
                write_entries(self.len(), self.iter(), context)
            }

            fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
                read_entries::<K, V, Self>(context)
            }

            fn braid_type_id(registry: &TypeRegistry) -> Result<Arc<str>, Error> {
                Ok(container_type_id(
                    ContainerKind::Map,
                    &[registry.type_id_of::<K>()?, registry.type_id_of::<V>()?],
                ))
            }

            fn braid_type_id_dyn(&self, registry: &TypeRegistry) -> Result<Arc<str>, Error> {
                registry.type_id_of::<Self>()
            }

            fn braid_lookup_key() -> LookupKey {
                LookupKey::Container(ContainerKind::Map)
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

        impl<K: $($key_bound)+, V> BraidDefault for $map<K, V> {
            fn braid_default() -> Self {
                $map::new()
            }
        }
    };
}

impl_map_serializer!(HashMap, Eq + Hash);
impl_map_serializer!(BTreeMap, Ord);
