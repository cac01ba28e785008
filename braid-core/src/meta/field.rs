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

//! Field descriptors and their resolution across an embedded-base hierarchy.
//!
//! A type fills a [`FieldDecls`] once with everything it declares: plain
//! fields, split getters and setters, markers placed apart from accessors, and
//! embedded bases. [`FieldDecls::resolve`] merges those declarations into the
//! ordered descriptor list that drives the field loop on the wire.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{ObjectSerializer, Serializer};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub type WriteFieldFn<T> = Arc<dyn Fn(&T, &mut WriteContext) -> Result<(), Error> + Send + Sync>;
pub type ReadFieldFn<T> = Arc<dyn Fn(&mut T, &mut ReadContext) -> Result<(), Error> + Send + Sync>;

/// One serializable member of `T`.
pub struct FieldDescriptor<T> {
    id: Arc<str>,
    member: &'static str,
    declaring_type: &'static str,
    value_type: &'static str,
    write: WriteFieldFn<T>,
    read: ReadFieldFn<T>,
}

impl<T> FieldDescriptor<T> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn member(&self) -> &'static str {
        self.member
    }

    pub fn declaring_type(&self) -> &'static str {
        self.declaring_type
    }

    pub fn value_type(&self) -> &'static str {
        self.value_type
    }

    /// Writes the member's current value, type id included.
    #[inline(always)]
    pub fn write(&self, value: &T, context: &mut WriteContext) -> Result<(), Error> {
        (self.write)(value, context)
    }

    /// Reads a full value from the stream and assigns it to the member.
    #[inline(always)]
    pub fn read(&self, value: &mut T, context: &mut ReadContext) -> Result<(), Error> {
        (self.read)(value, context)
    }
}

impl<T> Clone for FieldDescriptor<T> {
    fn clone(&self) -> Self {
        FieldDescriptor {
            id: self.id.clone(),
            member: self.member,
            declaring_type: self.declaring_type,
            value_type: self.value_type,
            write: self.write.clone(),
            read: self.read.clone(),
        }
    }
}

impl<T> std::fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("id", &self.id)
            .field("member", &self.member)
            .field("declaring_type", &self.declaring_type)
            .field("value_type", &self.value_type)
            .finish()
    }
}

struct FieldDecl<T> {
    member: &'static str,
    declaring_type: &'static str,
    id: Option<String>,
    getter_type: Option<&'static str>,
    setter_type: Option<&'static str>,
    write: Option<WriteFieldFn<T>>,
    read: Option<ReadFieldFn<T>>,
}

impl<T: 'static> FieldDecl<T> {
    fn new(member: &'static str, declaring_type: &'static str) -> Self {
        FieldDecl {
            member,
            declaring_type,
            id: None,
            getter_type: None,
            setter_type: None,
            write: None,
            read: None,
        }
    }

    /// Re-targets a declaration of an embedded base `T` onto the embedding type `O`.
    fn lift<O: 'static>(self, get: fn(&O) -> &T, get_mut: fn(&mut O) -> &mut T) -> FieldDecl<O> {
        FieldDecl {
            member: self.member,
            declaring_type: self.declaring_type,
            id: self.id,
            getter_type: self.getter_type,
            setter_type: self.setter_type,
            write: self.write.map(|write| -> WriteFieldFn<O> {
                Arc::new(move |outer: &O, context: &mut WriteContext| write(get(outer), context))
            }),
            read: self.read.map(|read| -> ReadFieldFn<O> {
                Arc::new(move |outer: &mut O, context: &mut ReadContext| {
                    read(get_mut(outer), context)
                })
            }),
        }
    }
}

/// Declarations of one type, in declaration order, own members first.
pub struct FieldDecls<T> {
    declaring_type: &'static str,
    decls: Vec<FieldDecl<T>>,
}

impl<T: 'static> FieldDecls<T> {
    pub fn new(declaring_type: &'static str) -> Self {
        FieldDecls {
            declaring_type,
            decls: Vec::new(),
        }
    }

    pub fn declaring_type(&self) -> &'static str {
        self.declaring_type
    }

    /// Declares a plain field with both accessors and its id.
    pub fn field<V: Serializer>(
        &mut self,
        id: &str,
        member: &'static str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> &mut Self {
        let mut decl = FieldDecl::new(member, self.declaring_type);
        decl.id = Some(id.to_string());
        decl.getter_type = Some(std::any::type_name::<V>());
        decl.setter_type = Some(std::any::type_name::<V>());
        decl.write = Some(Arc::new(move |value: &T, context: &mut WriteContext| {
            get(value).braid_write(context)
        }));
        decl.read = Some(Arc::new(move |value: &mut T, context: &mut ReadContext| {
            *get_mut(value) = V::braid_read(context)?;
            Ok(())
        }));
        self.decls.push(decl);
        self
    }

    /// Declares the read accessor of a member. `id` may be given here, on the
    /// setter, or through [`FieldDecls::marker`].
    pub fn getter<V: Serializer>(
        &mut self,
        member: &'static str,
        id: Option<&str>,
        get: fn(&T) -> V,
    ) -> &mut Self {
        let mut decl = FieldDecl::new(member, self.declaring_type);
        decl.id = id.map(str::to_string);
        decl.getter_type = Some(std::any::type_name::<V>());
        decl.write = Some(Arc::new(move |value: &T, context: &mut WriteContext| {
            get(value).braid_write(context)
        }));
        self.decls.push(decl);
        self
    }

    /// Declares the write accessor of a member.
    pub fn setter<V: Serializer>(
        &mut self,
        member: &'static str,
        id: Option<&str>,
        set: fn(&mut T, V),
    ) -> &mut Self {
        let mut decl = FieldDecl::new(member, self.declaring_type);
        decl.id = id.map(str::to_string);
        decl.setter_type = Some(std::any::type_name::<V>());
        decl.read = Some(Arc::new(move |value: &mut T, context: &mut ReadContext| {
            set(value, V::braid_read(context)?);
            Ok(())
        }));
        self.decls.push(decl);
        self
    }

    /// Attaches an id to a member declared elsewhere.
    pub fn marker(&mut self, member: &'static str, id: &str) -> &mut Self {
        let mut decl = FieldDecl::new(member, self.declaring_type);
        decl.id = Some(id.to_string());
        self.decls.push(decl);
        self
    }

    /// Lifts every declaration of the embedded base `B`.
    pub fn base<B: ObjectSerializer>(
        &mut self,
        get: fn(&T) -> &B,
        get_mut: fn(&mut T) -> &mut B,
    ) -> &mut Self {
        let mut base = FieldDecls::<B>::new(std::any::type_name::<B>());
        B::braid_declare_fields(&mut base);
        self.decls
            .extend(base.decls.into_iter().map(|decl| decl.lift(get, get_mut)));
        self
    }

    /// Merges split declarations and returns the descriptors sorted by id.
    pub fn resolve(self) -> Result<Vec<FieldDescriptor<T>>, Error> {
        let type_name = std::any::type_name::<T>();
        let mut merged: Vec<FieldDecl<T>> = Vec::with_capacity(self.decls.len());
        let mut slots: HashMap<(&'static str, &'static str), usize> = HashMap::new();
        for decl in self.decls {
            let key = (decl.member, decl.declaring_type);
            let Some(&slot) = slots.get(&key) else {
                slots.insert(key, merged.len());
                merged.push(decl);
                continue;
            };
            let target = &mut merged[slot];
            match (&target.id, decl.id) {
                (Some(existing), Some(id)) if *existing != id => {
                    return Err(Error::invalid_id(format!(
                        "member `{}` of `{}` is marked with both `{existing}` and `{id}`",
                        decl.member, decl.declaring_type
                    )));
                }
                (None, id @ Some(_)) => target.id = id,
                _ => {}
            }
            target.getter_type = target.getter_type.or(decl.getter_type);
            target.setter_type = target.setter_type.or(decl.setter_type);
            if decl.write.is_some() {
                target.write = decl.write;
            }
            if decl.read.is_some() {
                target.read = decl.read;
            }
        }

        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(merged.len());
        for decl in merged {
            // unmarked members are not serialized
            let Some(id) = decl.id else {
                continue;
            };
            if id.is_empty() {
                return Err(Error::invalid_id(format!(
                    "member `{}` of `{}` has an empty field id",
                    decl.member, decl.declaring_type
                )));
            }
            let (Some(write), Some(read)) = (decl.write, decl.read) else {
                return Err(Error::missing_accessor(decl.declaring_type, decl.member));
            };
            let value_type = match (decl.getter_type, decl.setter_type) {
                (Some(getter), Some(setter)) if getter != setter => {
                    return Err(Error::accessor_type_mismatch(format!(
                        "member `{}` of `{}` reads `{getter}` but writes `{setter}`",
                        decl.member, decl.declaring_type
                    )));
                }
                (Some(getter), _) => getter,
                (None, setter) => setter.unwrap_or("?"),
            };
            if !seen.insert(id.clone()) {
                return Err(Error::duplicate_field_id(type_name, id));
            }
            fields.push(FieldDescriptor {
                id: Arc::from(id),
                member: decl.member,
                declaring_type: decl.declaring_type,
                value_type,
                write,
                read,
            });
        }
        fields.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(fields)
    }
}

/// Resolved fields of one concrete type plus the registration data its
/// codec needs. Built once per type and shared.
pub struct FieldTable<T> {
    type_id: Arc<str>,
    version: i32,
    min_supported_version: i32,
    fields: Vec<FieldDescriptor<T>>,
    index: HashMap<Arc<str>, usize>,
}

impl<T> FieldTable<T> {
    pub(crate) fn new(
        type_id: Arc<str>,
        version: i32,
        min_supported_version: i32,
        fields: Vec<FieldDescriptor<T>>,
    ) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.id.clone(), i))
            .collect();
        FieldTable {
            type_id,
            version,
            min_supported_version,
            fields,
            index,
        }
    }

    pub fn wire_id(&self) -> &str {
        &self.type_id
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn min_supported_version(&self) -> i32 {
        self.min_supported_version
    }

    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    pub fn find(&self, id: &str) -> Option<&FieldDescriptor<T>> {
        self.index.get(id).map(|&i| &self.fields[i])
    }
}
