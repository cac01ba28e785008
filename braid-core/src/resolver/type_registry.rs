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

//! Process-wide binding of Rust types to wire type ids.
//!
//! Descriptors live behind a `parking_lot::RwLock`: registration takes the
//! write lock and is expected to happen at startup, lookups share the read
//! lock. Everything derived from a descriptor (encoded type ids, field
//! tables, compiled codecs, adapters) is memoized in `DashMap`s with
//! get-or-insert semantics, so racing first uses may build twice but publish
//! once.

use crate::error::Error;
use crate::meta::field::{FieldDecls, FieldTable};
use crate::meta::type_grammar::{self, CompoundTypeId};
use crate::not_allowed;
use crate::resolver::codec::{CompiledCodec, Delegate};
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::polymorphic::Covariant;
use crate::serializer::{ObjectSerializer, Serializer};
use crate::types::{
    self, ContainerKind, LeafWidth, LookupKey, TypeKind, ARRAY, NULLABLE, RESERVED_TOKENS,
};
use chrono::{NaiveDate, NaiveDateTime};
use dashmap::DashMap;
use log::{debug, info};
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

pub type SkipFn = fn(&mut ReadContext) -> Result<(), Error>;
type CompileFn = fn(&TypeRegistry) -> Result<CompiledCodec, Error>;

/// Hand-written encoding of a type registered with [`TypeRegistry::register_custom`].
///
/// The bindings replace the body of the value; the type id is still written
/// in front of it. Without `skip`, a reader that does not know the type
/// cannot step over it.
pub struct CodecBindings<T> {
    pub write: fn(&T, &mut WriteContext) -> Result<(), Error>,
    pub read: fn(&mut ReadContext) -> Result<T, Error>,
    pub skip: Option<SkipFn>,
}

impl<T> Clone for CodecBindings<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CodecBindings<T> {}

/// Registration data of one wire type.
pub struct TypeDescriptor {
    type_id: Arc<str>,
    rust_name: &'static str,
    key: LookupKey,
    version: i32,
    min_supported_version: i32,
    kind: TypeKind,
    bindings: Option<Arc<dyn Any + Send + Sync>>,
    skip: Option<SkipFn>,
    compile: Option<CompileFn>,
}

impl TypeDescriptor {
    pub fn wire_id(&self) -> &str {
        &self.type_id
    }

    pub fn wire_id_arc(&self) -> Arc<str> {
        self.type_id.clone()
    }

    pub fn rust_name(&self) -> &'static str {
        self.rust_name
    }

    pub fn key(&self) -> LookupKey {
        self.key
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn min_supported_version(&self) -> i32 {
        self.min_supported_version
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_generic_definition(&self) -> bool {
        matches!(self.key, LookupKey::Generic(_))
    }

    /// Skip binding of a custom type.
    pub fn skip_fn(&self) -> Option<SkipFn> {
        self.skip
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_id", &self.type_id)
            .field("rust_name", &self.rust_name)
            .field("version", &self.version)
            .field("min_supported_version", &self.min_supported_version)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Structural result of decoding a type id.
#[derive(Debug, Clone)]
pub enum ResolvedType {
    Registered(Arc<TypeDescriptor>),
    Array(Box<ResolvedType>),
    /// Array element that may be null.
    Nullable(Box<ResolvedType>),
    Container(ContainerKind, Vec<ResolvedType>),
    Generic(Arc<TypeDescriptor>, Vec<ResolvedType>),
}

/// Registration recorded by `#[derive(BraidObject)]` on types that carry
/// `#[braid(type_id = "..")]`, collected at link time.
pub struct AutoRegistration {
    rust_name: &'static str,
    register: fn(&TypeRegistry) -> Result<(), Error>,
}

impl AutoRegistration {
    pub const fn new(rust_name: &'static str, register: fn(&TypeRegistry) -> Result<(), Error>) -> Self {
        AutoRegistration {
            rust_name,
            register,
        }
    }
}

inventory::collect!(AutoRegistration);

/// Registers `T` under its declared type id. Used by auto-registration.
pub fn register_declared<T: ObjectSerializer>(registry: &TypeRegistry) -> Result<(), Error> {
    registry.register_declared::<T>()
}

#[derive(Default)]
struct Tables {
    by_key: HashMap<LookupKey, Arc<TypeDescriptor>>,
    by_id: HashMap<Arc<str>, Arc<TypeDescriptor>>,
}

pub struct TypeRegistry {
    tables: RwLock<Tables>,
    type_ids: DashMap<TypeId, Arc<str>>,
    field_tables: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    codecs: DashMap<TypeId, Arc<CompiledCodec>>,
    codecs_by_id: DashMap<Arc<str>, Arc<CompiledCodec>>,
    adapters: DashMap<(TypeId, TypeId), Arc<dyn Any + Send + Sync>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry holding the built-in leaf types.
    pub fn new() -> TypeRegistry {
        let registry = TypeRegistry::empty();
        registry.register_builtin_types();
        registry
    }

    fn empty() -> TypeRegistry {
        TypeRegistry {
            tables: RwLock::new(Tables::default()),
            type_ids: DashMap::new(),
            field_tables: DashMap::new(),
            codecs: DashMap::new(),
            codecs_by_id: DashMap::new(),
            adapters: DashMap::new(),
        }
    }

    fn register_builtin_types(&self) {
        use LeafWidth::{Fixed, Prefixed};
        self.register_leaf::<bool>(types::BOOL, Fixed(1));
        self.register_leaf::<i8>(types::INT8, Fixed(1));
        self.register_leaf::<u8>(types::UINT8, Fixed(1));
        self.register_leaf::<i16>(types::INT16, Fixed(2));
        self.register_leaf::<u16>(types::UINT16, Fixed(2));
        self.register_leaf::<i32>(types::INT32, Fixed(4));
        self.register_leaf::<u32>(types::UINT32, Fixed(4));
        self.register_leaf::<i64>(types::INT64, Fixed(8));
        self.register_leaf::<u64>(types::UINT64, Fixed(8));
        self.register_leaf::<i128>(types::INT128, Fixed(16));
        self.register_leaf::<u128>(types::UINT128, Fixed(16));
        self.register_leaf::<f32>(types::FLOAT32, Fixed(4));
        self.register_leaf::<f64>(types::FLOAT64, Fixed(8));
        self.register_leaf::<char>(types::CHAR, Fixed(4));
        self.register_leaf::<String>(types::STRING, Prefixed);
        self.register_leaf::<NaiveDateTime>(types::TIMESTAMP, Fixed(8));
        self.register_leaf::<NaiveDate>(types::DATE, Fixed(4));
        self.register_leaf::<Duration>(types::DURATION, Fixed(12));

        // common instantiations readable through the non-generic entry points
        macro_rules! prepare {
            ($($ty:ty),* $(,)?) => {
                $(
                    if let Err(e) = self.codec_of::<$ty>() {
                        debug!("skipped built-in codec for {}: {e}", stringify!($ty));
                    }
                )*
            };
        }
        prepare!(
            Vec<bool>,
            Vec<i8>,
            Vec<u8>,
            Vec<i16>,
            Vec<u16>,
            Vec<i32>,
            Vec<u32>,
            Vec<i64>,
            Vec<u64>,
            Vec<f32>,
            Vec<f64>,
            Vec<String>,
            HashSet<String>,
            HashMap<String, String>,
        );
    }

    fn register_leaf<T: Serializer>(&self, id: &'static str, width: LeafWidth) {
        let descriptor = TypeDescriptor {
            type_id: Arc::from(id),
            rust_name: std::any::type_name::<T>(),
            key: LookupKey::Type(TypeId::of::<T>()),
            version: 0,
            min_supported_version: 0,
            kind: TypeKind::Leaf(width),
            bindings: None,
            skip: None,
            compile: Some(CompiledCodec::compile::<T>),
        };
        let descriptor = Arc::new(descriptor);
        let mut tables = self.tables.write();
        tables.by_key.insert(descriptor.key, descriptor.clone());
        tables.by_id.insert(descriptor.type_id.clone(), descriptor);
    }

    fn publish(&self, descriptor: TypeDescriptor) -> Result<(), Error> {
        let mut tables = self.tables.write();
        if tables.by_key.contains_key(&descriptor.key) {
            return Err(Error::duplicate_type(descriptor.rust_name));
        }
        if tables.by_id.contains_key(&*descriptor.type_id) {
            return Err(Error::duplicate_id(descriptor.type_id.to_string()));
        }
        debug!(
            "registered `{}` as `{}` (version {}, min supported {})",
            descriptor.rust_name, descriptor.type_id, descriptor.version, descriptor.min_supported_version
        );
        let descriptor = Arc::new(descriptor);
        tables.by_key.insert(descriptor.key, descriptor.clone());
        tables.by_id.insert(descriptor.type_id.clone(), descriptor);
        Ok(())
    }

    fn check_versions(id: &str, version: i32, min_supported_version: i32) -> Result<(), Error> {
        if version < 0 || min_supported_version < 0 || version < min_supported_version {
            return Err(Error::invalid_version(format!(
                "type `{id}` has version {version} below its minimum supported version {min_supported_version}"
            )));
        }
        Ok(())
    }

    /// Checks that `T` names a concrete, non-array, non-enum type of its own.
    fn concrete_key<T: Serializer>() -> Result<LookupKey, Error> {
        let name = std::any::type_name::<T>();
        match T::braid_lookup_key() {
            LookupKey::Type(id) if id == TypeId::of::<T>() && !T::braid_is_transparent() => {
                Ok(LookupKey::Type(id))
            }
            LookupKey::Type(_) => Err(Error::not_allowed(format!(
                "`{name}` shares the type id of another type and cannot be registered"
            ))),
            LookupKey::Generic(_) => Err(Error::closed_generic(name)),
            LookupKey::Array => Err(Error::array_registration(name)),
            LookupKey::Container(kind) => Err(Error::reserved_id(kind.token())),
        }
    }

    /// Registers an object type at its declared version.
    pub fn register<T: ObjectSerializer>(&self, id: &str) -> Result<(), Error> {
        let declaration = T::braid_declaration();
        self.register_versioned::<T>(id, declaration.version, declaration.min_supported_version)
    }

    pub fn register_versioned<T: ObjectSerializer>(
        &self,
        id: &str,
        version: i32,
        min_supported_version: i32,
    ) -> Result<(), Error> {
        type_grammar::validate_token(id)?;
        Self::check_versions(id, version, min_supported_version)?;
        let key = Self::concrete_key::<T>()?;
        self.publish(TypeDescriptor {
            type_id: Arc::from(id),
            rust_name: std::any::type_name::<T>(),
            key,
            version,
            min_supported_version,
            kind: TypeKind::Object {
                reference: T::braid_is_reference(),
            },
            bindings: None,
            skip: None,
            compile: Some(CompiledCodec::compile::<T>),
        })
    }

    /// Registers `T` under the id of its `#[braid(type_id = "..")]` declaration.
    pub fn register_declared<T: ObjectSerializer>(&self) -> Result<(), Error> {
        let declaration = T::braid_declaration();
        let Some(id) = declaration.type_id else {
            not_allowed!("`{}` does not declare a type id", std::any::type_name::<T>());
        };
        self.register_versioned::<T>(id, declaration.version, declaration.min_supported_version)
    }

    /// Registers the open generic definition instantiated by `T`.
    ///
    /// Any instantiation identifies the definition; its arguments are ignored.
    pub fn register_generic<T: ObjectSerializer>(
        &self,
        id: &str,
        version: i32,
        min_supported_version: i32,
    ) -> Result<(), Error> {
        type_grammar::validate_token(id)?;
        Self::check_versions(id, version, min_supported_version)?;
        let Some(definition) = T::braid_generic_definition() else {
            not_allowed!(
                "`{}` is not generic, register it with `register`",
                std::any::type_name::<T>()
            );
        };
        self.publish(TypeDescriptor {
            type_id: Arc::from(id),
            rust_name: definition,
            key: LookupKey::Generic(definition),
            version,
            min_supported_version,
            kind: TypeKind::Object {
                reference: T::braid_is_reference(),
            },
            bindings: None,
            skip: None,
            // instantiations are compiled on first use through `codec_of`
            compile: None,
        })
    }

    /// Registers a type whose body is produced by hand-written bindings.
    pub fn register_custom<T: Serializer>(
        &self,
        id: &str,
        version: i32,
        min_supported_version: i32,
        bindings: CodecBindings<T>,
    ) -> Result<(), Error> {
        type_grammar::validate_token(id)?;
        Self::check_versions(id, version, min_supported_version)?;
        let key = Self::concrete_key::<T>()?;
        let erased: Arc<dyn Any + Send + Sync> = Arc::new(bindings);
        self.publish(TypeDescriptor {
            type_id: Arc::from(id),
            rust_name: std::any::type_name::<T>(),
            key,
            version,
            min_supported_version,
            kind: TypeKind::Custom,
            bindings: Some(erased),
            skip: bindings.skip,
            compile: Some(CompiledCodec::compile::<T>),
        })
    }

    /// Registers every type submitted for auto-registration in this binary.
    pub fn scan(&self) -> Result<usize, Error> {
        let mut count = 0;
        for entry in inventory::iter::<AutoRegistration> {
            (entry.register)(self).map_err(|e| {
                log::error!("auto-registration of `{}` failed: {e}", entry.rust_name);
                e
            })?;
            count += 1;
        }
        info!("auto-registered {count} types");
        Ok(count)
    }

    pub fn resolve_key(&self, key: LookupKey) -> Result<Arc<TypeDescriptor>, Error> {
        self.tables
            .read()
            .by_key
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("no type is registered for {key:?}")))
    }

    pub fn resolve_by_type<T: Serializer>(&self) -> Result<Arc<TypeDescriptor>, Error> {
        self.resolve_key(T::braid_lookup_key()).map_err(|_| {
            Error::not_found(format!(
                "type `{}` is not registered",
                std::any::type_name::<T>()
            ))
        })
    }

    pub fn resolve_by_id(&self, id: &str) -> Result<Arc<TypeDescriptor>, Error> {
        self.tables
            .read()
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("unknown type id `{id}`")))
    }

    pub fn is_registered<T: Serializer>(&self) -> bool {
        self.tables.read().by_key.contains_key(&T::braid_lookup_key())
    }

    /// Wire type id of `T`, compound ids included. Memoized per Rust type.
    pub fn type_id_of<T: Serializer>(&self) -> Result<Arc<str>, Error> {
        let key = TypeId::of::<T>();
        if let Some(id) = self.type_ids.get(&key) {
            return Ok(id.value().clone());
        }
        let id = T::braid_type_id(self)?;
        Ok(self.type_ids.entry(key).or_insert(id).value().clone())
    }

    /// Id of an instantiation of the generic definition `definition`.
    pub fn generic_type_id(&self, definition: &'static str, args: &[Arc<str>]) -> Result<Arc<str>, Error> {
        let descriptor = self.resolve_key(LookupKey::Generic(definition)).map_err(|_| {
            Error::not_found(format!("generic definition `{definition}` is not registered"))
        })?;
        Ok(Arc::from(type_grammar::encode(descriptor.wire_id(), args)))
    }

    /// Resolves every component of a type id.
    pub fn decode(&self, id: &str) -> Result<ResolvedType, Error> {
        let parsed = type_grammar::parse(id)?;
        self.decode_parsed(&parsed)
    }

    fn decode_parsed(&self, parsed: &CompoundTypeId<'_>) -> Result<ResolvedType, Error> {
        let args = parsed
            .args
            .iter()
            .map(|arg| self.decode(arg))
            .collect::<Result<Vec<_>, Error>>()?;
        let arity = |expected: usize| -> Result<(), Error> {
            if args.len() != expected {
                return Err(Error::malformed_type_id(type_grammar::encode(
                    parsed.base,
                    &parsed.args,
                )));
            }
            Ok(())
        };
        if parsed.base == ARRAY {
            arity(1)?;
            let element = args.into_iter().next().ok_or_else(|| Error::malformed_type_id(ARRAY))?;
            return Ok(ResolvedType::Array(Box::new(element)));
        }
        if parsed.base == NULLABLE {
            arity(1)?;
            let inner = args.into_iter().next().ok_or_else(|| Error::malformed_type_id(NULLABLE))?;
            return Ok(ResolvedType::Nullable(Box::new(inner)));
        }
        if let Some(kind) = ContainerKind::from_token(parsed.base) {
            arity(kind.arity())?;
            return Ok(ResolvedType::Container(kind, args));
        }
        if RESERVED_TOKENS.contains(&parsed.base) {
            return Err(Error::not_found(format!(
                "reserved token `{}` does not name a type",
                parsed.base
            )));
        }
        let descriptor = self.resolve_by_id(parsed.base)?;
        match (descriptor.is_generic_definition(), args.is_empty()) {
            (false, true) => Ok(ResolvedType::Registered(descriptor)),
            (true, false) => Ok(ResolvedType::Generic(descriptor, args)),
            (true, true) => Err(Error::malformed_type_id(format!(
                "`{}` is generic and needs arguments",
                parsed.base
            ))),
            (false, false) => Err(Error::malformed_type_id(format!(
                "`{}` is not generic",
                parsed.base
            ))),
        }
    }

    /// Resolved field table of `T`, built on first use.
    pub fn fields_of<T: ObjectSerializer>(&self) -> Result<Arc<FieldTable<T>>, Error> {
        let key = TypeId::of::<T>();
        if let Some(table) = self.field_tables.get(&key) {
            if let Ok(table) = table.value().clone().downcast::<FieldTable<T>>() {
                return Ok(table);
            }
        }
        let descriptor = self.resolve_by_type::<T>()?;
        if !matches!(descriptor.kind(), TypeKind::Object { .. }) {
            return Err(Error::not_allowed(format!(
                "`{}` is registered without a field table",
                std::any::type_name::<T>()
            )));
        }
        let mut decls = FieldDecls::<T>::new(std::any::type_name::<T>());
        T::braid_declare_fields(&mut decls);
        let fields = decls.resolve()?;
        debug!(
            "resolved {} fields for `{}`",
            fields.len(),
            std::any::type_name::<T>()
        );
        let table: Arc<dyn Any + Send + Sync> = Arc::new(FieldTable::new(
            self.type_id_of::<T>()?,
            descriptor.version(),
            descriptor.min_supported_version(),
            fields,
        ));
        let published = self.field_tables.entry(key).or_insert(table).value().clone();
        published.downcast::<FieldTable<T>>().map_err(|_| {
            Error::type_mismatch(std::any::type_name::<T>(), "a cached field table of another type")
        })
    }

    /// Custom bindings of `T`.
    pub fn bindings_of<T: Serializer>(&self) -> Result<Arc<CodecBindings<T>>, Error> {
        let descriptor = self.resolve_by_type::<T>()?;
        let bindings = descriptor.bindings.clone().ok_or_else(|| {
            Error::not_found(format!(
                "`{}` is registered without custom bindings",
                std::any::type_name::<T>()
            ))
        })?;
        bindings.downcast::<CodecBindings<T>>().map_err(|_| {
            Error::type_mismatch(std::any::type_name::<T>(), descriptor.rust_name())
        })
    }

    /// Compiled codec of `T`, compiled on first use.
    pub fn codec_of<T: Serializer>(&self) -> Result<Arc<CompiledCodec>, Error> {
        let key = TypeId::of::<T>();
        if let Some(codec) = self.codecs.get(&key) {
            return Ok(codec.value().clone());
        }
        let codec = Arc::new(CompiledCodec::new::<T>(self)?);
        debug!("compiled codec for `{}` as `{}`", codec.rust_name(), codec.wire_id());
        let codec = self.codecs.entry(key).or_insert(codec).value().clone();
        // wrappers and normalized types share the id of another type
        let canonical = !T::braid_is_transparent()
            && match T::braid_lookup_key() {
                LookupKey::Type(id) => id == key,
                _ => true,
            };
        if canonical {
            self.codecs_by_id
                .entry(codec.wire_id().clone())
                .or_insert_with(|| codec.clone());
        }
        Ok(codec)
    }

    /// Codec of the concrete type named by a wire type id.
    ///
    /// Registered non-generic types compile on demand. Compound ids only
    /// resolve to instantiations compiled earlier in this process.
    pub fn codec_by_id(&self, id: &str) -> Result<Arc<CompiledCodec>, Error> {
        if let Some(codec) = self.codecs_by_id.get(id) {
            return Ok(codec.value().clone());
        }
        let parsed = type_grammar::parse(id)?;
        if parsed.is_compound() {
            return Err(Error::not_found(format!(
                "no codec is compiled for `{id}`, prepare the instantiation before reading it"
            )));
        }
        let descriptor = self.resolve_by_id(id)?;
        let compile = descriptor.compile.ok_or_else(|| {
            Error::not_found(format!("generic definition `{id}` needs type arguments"))
        })?;
        let codec = Arc::new(compile(self)?);
        debug!("compiled codec for `{}` as `{}`", codec.rust_name(), codec.wire_id());
        let codec = self
            .codecs
            .entry(codec.rust_type())
            .or_insert(codec)
            .value()
            .clone();
        Ok(self
            .codecs_by_id
            .entry(codec.wire_id().clone())
            .or_insert(codec)
            .value()
            .clone())
    }

    /// Adapts the codec of a runtime type to the declared slot type `To`.
    pub fn adapter<To: ?Sized + Covariant>(
        &self,
        codec: &Arc<CompiledCodec>,
    ) -> Result<Arc<Delegate<To>>, Error> {
        let key = (codec.rust_type(), TypeId::of::<To>());
        if let Some(found) = self.adapters.get(&key) {
            if let Ok(delegate) = found.value().clone().downcast::<Delegate<To>>() {
                return Ok(delegate);
            }
        }
        let upcast = To::braid_upcasts()
            .into_iter()
            .find(|upcast| upcast.from == codec.rust_type())
            .ok_or_else(|| {
                Error::type_mismatch(std::any::type_name::<To>(), codec.rust_name())
            })?;
        debug!(
            "built adapter from `{}` to `{}`",
            codec.rust_name(),
            std::any::type_name::<To>()
        );
        let delegate: Arc<dyn Any + Send + Sync> = Arc::new(Delegate::new(codec.clone(), upcast));
        let published = self.adapters.entry(key).or_insert(delegate).value().clone();
        published.downcast::<Delegate<To>>().map_err(|_| {
            Error::type_mismatch(std::any::type_name::<To>(), codec.rust_name())
        })
    }
}
