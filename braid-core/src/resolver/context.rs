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

use crate::buffer::{Reader, Writer};
use crate::config::Config;
use crate::error::Error;
use crate::resolver::ref_resolver::{RefReader, RefWriter};
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::Serializer;
use crate::types::{NULL, NULL_REF};

/// State of one top-level serialize call.
///
/// Created by the outermost call and passed explicitly through every nested
/// write, so the reference scope is confined to this call and this thread.
pub struct WriteContext<'a> {
    pub writer: &'a mut Writer,
    registry: &'a TypeRegistry,
    config: &'a Config,
    pub ref_writer: RefWriter,
    depth: u32,
}

impl<'a> WriteContext<'a> {
    pub fn new(registry: &'a TypeRegistry, config: &'a Config, writer: &'a mut Writer) -> Self {
        WriteContext {
            writer,
            registry,
            config,
            ref_writer: RefWriter::new(),
            depth: 0,
        }
    }

    #[inline(always)]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    #[inline(always)]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    #[inline(always)]
    pub fn write_type_id(&mut self, type_id: &str) -> Result<(), Error> {
        self.writer.write_string(type_id)
    }

    /// Writes the null token and the null reference id.
    pub fn write_null(&mut self) -> Result<(), Error> {
        self.write_type_id(NULL)?;
        let (ref_id, _) = self.ref_writer.get_or_create_id(None);
        self.writer.write_i32(ref_id);
        Ok(())
    }

    /// Enters a composite body, failing once `max_depth` is exceeded.
    #[inline(always)]
    pub fn enter(&mut self) -> Result<(), Error> {
        self.depth += 1;
        if self.depth > self.config.max_depth() {
            return Err(Error::depth_exceed(format!(
                "nesting depth exceeds the configured maximum of {}",
                self.config.max_depth()
            )));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn leave(&mut self) {
        self.depth -= 1;
    }

    pub fn reset(&mut self) {
        self.ref_writer.reset();
        self.depth = 0;
    }
}

/// Position of a [`ReadContext`] that a failed attempt can return to.
#[derive(Clone, Copy, Debug)]
pub struct ReadCheckpoint {
    cursor: usize,
    next_ref_id: i32,
    depth: u32,
}

/// State of one top-level deserialize call.
pub struct ReadContext<'a> {
    pub reader: Reader<'a>,
    registry: &'a TypeRegistry,
    config: &'a Config,
    pub ref_reader: RefReader,
    depth: u32,
}

impl<'a> ReadContext<'a> {
    pub fn new(registry: &'a TypeRegistry, config: &'a Config, reader: Reader<'a>) -> Self {
        ReadContext {
            reader,
            registry,
            config,
            ref_reader: RefReader::new(),
            depth: 0,
        }
    }

    #[inline(always)]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    #[inline(always)]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    #[inline(always)]
    pub fn read_type_id(&mut self) -> Result<&'a str, Error> {
        self.reader.read_str()
    }

    /// Checks a type id read from the stream against the static id of `T`.
    pub fn expect_type_id<T: Serializer>(&self, actual: &str) -> Result<(), Error> {
        let expected = self.registry.type_id_of::<T>()?;
        if *expected == *actual {
            return Ok(());
        }
        if actual == NULL {
            return Err(Error::invalid_data(format!(
                "unexpected null for non-nullable `{}`",
                std::any::type_name::<T>()
            )));
        }
        Err(Error::type_mismatch(expected.to_string(), actual.to_string()))
    }

    /// Reads the reference id that follows a null token.
    pub fn read_null_ref(&mut self) -> Result<(), Error> {
        let ref_id = self.reader.read_i32()?;
        if ref_id != NULL_REF {
            return Err(Error::invalid_ref(format!(
                "null token followed by reference id {ref_id}"
            )));
        }
        Ok(())
    }

    /// Reads a reference id that must denote a value.
    pub fn read_ref_id(&mut self) -> Result<i32, Error> {
        let ref_id = self.reader.read_i32()?;
        if ref_id == NULL_REF {
            return Err(Error::invalid_data("null reference for a non-nullable value"));
        }
        if ref_id < NULL_REF {
            return Err(Error::invalid_ref(format!("negative reference id {ref_id}")));
        }
        Ok(ref_id)
    }

    #[inline(always)]
    pub fn enter(&mut self) -> Result<(), Error> {
        self.depth += 1;
        if self.depth > self.config.max_depth() {
            return Err(Error::depth_exceed(format!(
                "nesting depth exceeds the configured maximum of {}",
                self.config.max_depth()
            )));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn leave(&mut self) {
        self.depth -= 1;
    }

    pub fn checkpoint(&self) -> ReadCheckpoint {
        ReadCheckpoint {
            cursor: self.reader.get_cursor(),
            next_ref_id: self.ref_reader.next_id(),
            depth: self.depth,
        }
    }

    /// Undoes everything read since `checkpoint`, reference ids included.
    pub fn rollback(&mut self, checkpoint: ReadCheckpoint) {
        self.reader.set_cursor(checkpoint.cursor);
        self.ref_reader.truncate(checkpoint.next_ref_id);
        self.depth = checkpoint.depth;
    }
}
