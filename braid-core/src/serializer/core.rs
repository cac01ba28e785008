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
use crate::meta::field::FieldDecls;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_registry::TypeRegistry;
use crate::types::LookupKey;
use std::any::{Any, TypeId};
use std::rc::Rc;
use std::sync::Arc;

/// Builds a value without running user construction.
///
/// Readers allocate with this before filling fields from the stream, and
/// fields missing from an older stream keep the value produced here.
pub trait BraidDefault: Sized {
    fn braid_default() -> Self;
}

// A blanket impl for `T: Default` would conflict with the impls for `Rc<T>`,
// `Option<T>` and the other wrappers, since upstream crates may add `Default`
// impls for them in future versions.

/// Wire codec of one Rust type.
///
/// Methods taking `&self` are object safe so that `dyn Trait` values with a
/// `Serializer` supertrait can be written through their vtable. Every value
/// is laid out as `type id`, then for reference kinds a reference id, then
/// its body.
pub trait Serializer: 'static {
    /// Entry point of the serialization: type id followed by the data.
    ///
    /// The type id is the one of the *runtime* value, which for `dyn Trait`
    /// slots differs from the declared type.
    fn braid_write(&self, context: &mut WriteContext) -> Result<(), Error> {
        let type_id = self.braid_type_id_dyn(context.registry())?;
        context.write_type_id(&type_id)?;
        self.braid_write_data(context)
    }

    /// Everything after the type id. Reference kinds that are owned get a
    /// fresh reference id; shared pointers override this to track identity.
    fn braid_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        if self.braid_is_reference_dyn() {
            let ref_id = context.ref_writer.next_owned_id();
            context.writer.write_i32(ref_id);
        }
        self.braid_write_body(context)
    }

    /// The body without type id or reference id.
    fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error>;

    fn braid_read(context: &mut ReadContext) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let type_id = context.read_type_id()?;
        Self::braid_read_with_type_id(context, type_id)
    }

    /// Reads the rest of a value whose type id was already consumed.
    fn braid_read_with_type_id(context: &mut ReadContext, type_id: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        context.expect_type_id::<Self>(type_id)?;
        Self::braid_read_data(context)
    }

    fn braid_read_data(context: &mut ReadContext) -> Result<Self, Error>
    where
        Self: Sized,
    {
        if Self::braid_is_reference() {
            let ref_id = context.read_ref_id()?;
            context.ref_reader.add_owned(ref_id)?;
        }
        Self::braid_read_body(context)
    }

    fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error>
    where
        Self: Sized;

    /// Reads a body into an existing value. Objects override this to fill
    /// fields in place, which lets shared cells register before reading.
    fn braid_read_body_into(&mut self, context: &mut ReadContext) -> Result<(), Error>
    where
        Self: Sized,
    {
        *self = Self::braid_read_body(context)?;
        Ok(())
    }

    /// Reads the body of a value shared through `Rc`, registered under `ref_id`.
    ///
    /// The id is claimed before and published after the body is read, so a
    /// plain `Rc<T>` cannot be the target of a back-reference from inside its
    /// own body. `RefCell<T>` overrides this to publish first.
    fn braid_read_rc_body(context: &mut ReadContext, ref_id: i32) -> Result<Rc<Self>, Error>
    where
        Self: Sized,
    {
        context.ref_reader.reserve(ref_id)?;
        let value = Rc::new(Self::braid_read_body(context)?);
        context.ref_reader.fill_rc(ref_id, value.clone())?;
        Ok(value)
    }

    fn braid_read_arc_body(context: &mut ReadContext, ref_id: i32) -> Result<Arc<Self>, Error>
    where
        Self: Sized + Send + Sync,
    {
        context.ref_reader.reserve(ref_id)?;
        let value = Arc::new(Self::braid_read_body(context)?);
        context.ref_reader.fill_arc(ref_id, value.clone())?;
        Ok(value)
    }

    /// Static type id of `Self`. Prefer [`TypeRegistry::type_id_of`], which caches it.
    fn braid_type_id(registry: &TypeRegistry) -> Result<Arc<str>, Error>
    where
        Self: Sized,
    {
        Ok(registry.resolve_key(Self::braid_lookup_key())?.wire_id_arc())
    }

    /// Type id of the runtime value.
    fn braid_type_id_dyn(&self, registry: &TypeRegistry) -> Result<Arc<str>, Error>;

    fn braid_lookup_key() -> LookupKey
    where
        Self: Sized,
    {
        LookupKey::Type(TypeId::of::<Self>())
    }

    /// Whether values carry a reference id after their type id.
    fn braid_is_reference() -> bool
    where
        Self: Sized,
    {
        false
    }

    fn braid_is_reference_dyn(&self) -> bool {
        false
    }

    /// Byte width of the body when it is a fixed-size leaf.
    fn braid_fixed_width() -> Option<usize>
    where
        Self: Sized,
    {
        None
    }

    /// Wrappers such as `Rc<T>` or `Option<T>` reuse the type id of `T`.
    fn braid_is_transparent() -> bool
    where
        Self: Sized,
    {
        false
    }

    fn as_any(&self) -> &dyn Any;
}

/// Type-level declaration carried by `#[braid(..)]` on a derived type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Declaration {
    pub type_id: Option<&'static str>,
    pub version: i32,
    pub min_supported_version: i32,
}

/// Serializer of a type with a versioned field table.
pub trait ObjectSerializer: Serializer + BraidDefault {
    /// Declares the serializable members of this type and its embedded bases.
    fn braid_declare_fields(decls: &mut FieldDecls<Self>);

    fn braid_declaration() -> Declaration {
        Declaration::default()
    }

    /// Open generic definition this type instantiates, if any.
    fn braid_generic_definition() -> Option<&'static str> {
        None
    }

    /// Runs before the version is written.
    fn braid_on_serializing(&self) {}

    /// Runs after the terminator was read, with the version found in the stream.
    fn braid_on_deserialized(&mut self, _version: i32) {}
}
