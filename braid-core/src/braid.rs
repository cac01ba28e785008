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

use crate::buffer::{with_scratch, Reader, Writer};
use crate::config::Config;
use crate::ensure;
use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_registry::{CodecBindings, TypeRegistry};
use crate::serializer::{ObjectSerializer, Serializer};
use crate::types::NULL;
use std::any::Any;
use std::io;
use std::sync::{Arc, OnceLock};

/// The braid serialization entry point.
///
/// `Braid` owns a [`TypeRegistry`] and a [`Config`]. Every top-level call
/// opens its own reference scope, so one instance can be shared freely
/// between threads.
///
/// # Examples
///
/// ```rust, ignore
/// use braid::{Braid, BraidObject};
///
/// #[derive(BraidObject, Debug, PartialEq)]
/// struct User {
///     #[braid(id = "name")]
///     name: String,
///     #[braid(id = "age")]
///     age: u32,
/// }
///
/// let braid = Braid::default();
/// braid.register::<User>("User")?;
/// let user = User { name: "Alice".to_string(), age: 30 };
/// let bytes = braid.serialize(&user)?;
/// let decoded: User = braid.deserialize(&bytes)?;
/// assert_eq!(user, decoded);
/// ```
///
/// Custom configuration:
///
/// ```rust
/// use braid_core::braid::Braid;
///
/// let braid = Braid::default()
///     .value_array_fast_path(false)
///     .max_depth(32);
/// ```
pub struct Braid {
    registry: Arc<TypeRegistry>,
    config: Config,
}

impl Default for Braid {
    fn default() -> Self {
        Braid::new(Config::default())
    }
}

impl Braid {
    /// Creates an instance with a fresh registry holding the built-in types.
    pub fn new(config: Config) -> Self {
        Braid {
            registry: Arc::new(TypeRegistry::new()),
            config,
        }
    }

    /// Creates an instance sharing an existing registry.
    pub fn with_registry(registry: Arc<TypeRegistry>, config: Config) -> Self {
        Braid { registry, config }
    }

    /// Enables or disables the value-array fast path.
    ///
    /// # Arguments
    ///
    /// * `enabled` - If `true`, arrays whose element type has a fixed width
    ///   are written as a flat run of raw element bodies. If `false`, every
    ///   element is written as a full value with its own type id.
    ///
    /// # Default
    ///
    /// The default value is `true`.
    ///
    /// # Note
    ///
    /// The switch is not recorded in the stream. Writer and reader must use
    /// the same setting.
    pub fn value_array_fast_path(mut self, enabled: bool) -> Self {
        self.config.value_array_fast_path = enabled;
        self
    }

    /// Sets the maximum nesting depth of objects, arrays and containers.
    ///
    /// Exceeding it fails with `DepthExceed` on both write and read, which
    /// bounds the recursion on hostile input.
    ///
    /// # Default
    ///
    /// The default value is `128`.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Registers an object type under `id` at its declared version.
    pub fn register<T: ObjectSerializer>(&self, id: &str) -> Result<(), Error> {
        self.registry.register::<T>(id)
    }

    pub fn register_versioned<T: ObjectSerializer>(
        &self,
        id: &str,
        version: i32,
        min_supported_version: i32,
    ) -> Result<(), Error> {
        self.registry
            .register_versioned::<T>(id, version, min_supported_version)
    }

    /// Registers the open generic definition that `T` instantiates.
    pub fn register_generic<T: ObjectSerializer>(
        &self,
        id: &str,
        version: i32,
        min_supported_version: i32,
    ) -> Result<(), Error> {
        self.registry
            .register_generic::<T>(id, version, min_supported_version)
    }

    /// Registers a type encoded by hand-written bindings.
    pub fn register_custom<T: Serializer>(
        &self,
        id: &str,
        version: i32,
        min_supported_version: i32,
        bindings: CodecBindings<T>,
    ) -> Result<(), Error> {
        self.registry
            .register_custom::<T>(id, version, min_supported_version, bindings)
    }

    /// Registers `T` under its `#[braid(type_id = "..")]` declaration.
    pub fn register_declared<T: ObjectSerializer>(&self) -> Result<(), Error> {
        self.registry.register_declared::<T>()
    }

    /// Registers every type that declares its type id, see [`TypeRegistry::scan`].
    pub fn scan(&self) -> Result<usize, Error> {
        self.registry.scan()
    }

    /// Compiles the codec of `T` ahead of use.
    ///
    /// Required before [`Braid::deserialize_dyn`] or a trait-object slot can
    /// read an instantiation with a compound type id, such as `array[Point]`.
    pub fn prepare<T: Serializer>(&self) -> Result<(), Error> {
        self.registry.codec_of::<T>().map(|_| ())
    }

    fn write_value<T: Serializer + ?Sized>(&self, value: &T, writer: &mut Writer) -> Result<(), Error> {
        let mut context = WriteContext::new(&self.registry, &self.config, writer);
        let result = value.braid_write(&mut context);
        context.reset();
        result
    }

    /// Serializes `value` into a new buffer.
    pub fn serialize<T: Serializer>(&self, value: &T) -> Result<Vec<u8>, Error> {
        with_scratch(|writer| {
            self.write_value(value, writer)?;
            Ok(writer.dump())
        })
    }

    /// Serializes `value`, appending the bytes to `buf`.
    pub fn serialize_into<T: Serializer>(&self, value: &T, buf: &mut Vec<u8>) -> Result<(), Error> {
        with_scratch(|writer| {
            self.write_value(value, writer)?;
            buf.extend_from_slice(writer.as_slice());
            Ok(())
        })
    }

    /// Serializes `value` into an `io::Write` sink.
    ///
    /// The value is encoded completely before the first byte reaches the sink.
    pub fn serialize_to<W: io::Write, T: Serializer>(&self, mut sink: W, value: &T) -> Result<(), Error> {
        with_scratch(|writer| {
            self.write_value(value, writer)?;
            sink.write_all(writer.as_slice())?;
            Ok(())
        })
    }

    /// Serializes a value whose concrete type is only known at run time.
    pub fn serialize_dyn(&self, value: &dyn Serializer) -> Result<Vec<u8>, Error> {
        with_scratch(|writer| {
            self.write_value(value, writer)?;
            Ok(writer.dump())
        })
    }

    fn read_context<'a>(&'a self, bytes: &'a [u8]) -> ReadContext<'a> {
        ReadContext::new(&self.registry, &self.config, Reader::new(bytes))
    }

    fn ensure_consumed(context: &ReadContext) -> Result<(), Error> {
        let remaining = context.reader.remaining();
        ensure!(remaining == 0, "{} trailing bytes after the value", remaining);
        Ok(())
    }

    /// Deserializes one value of type `T` spanning all of `bytes`.
    pub fn deserialize<T: Serializer>(&self, bytes: &[u8]) -> Result<T, Error> {
        let mut context = self.read_context(bytes);
        let value = T::braid_read(&mut context)?;
        Self::ensure_consumed(&context)?;
        Ok(value)
    }

    /// Reads `source` to its end and deserializes one value of type `T`.
    pub fn deserialize_from<T: Serializer, R: io::Read>(&self, mut source: R) -> Result<T, Error> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;
        self.deserialize(&bytes)
    }

    /// Deserializes a value of the type named by the stream's type id.
    ///
    /// Registered non-generic types resolve on demand. Compound ids resolve
    /// only after the instantiation was prepared with [`Braid::prepare`].
    pub fn deserialize_dyn(&self, bytes: &[u8]) -> Result<Box<dyn Any>, Error> {
        let mut context = self.read_context(bytes);
        let type_id = context.read_type_id()?;
        if type_id == NULL {
            return Err(Error::invalid_data("top-level value is null"));
        }
        let codec = self.registry.codec_by_id(type_id)?;
        let value = codec.read_box(&mut context)?;
        Self::ensure_consumed(&context)?;
        Ok(value)
    }

    /// The process-wide instance, scanned for declared types on first use.
    pub fn global() -> Result<&'static Braid, Error> {
        static GLOBAL: OnceLock<Braid> = OnceLock::new();
        if let Some(braid) = GLOBAL.get() {
            return Ok(braid);
        }
        let braid = Braid::default();
        braid.scan()?;
        Ok(GLOBAL.get_or_init(|| braid))
    }
}

/// Shorthand for [`Braid::global`].
pub fn global() -> Result<&'static Braid, Error> {
    Braid::global()
}
