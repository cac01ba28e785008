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

//! Versioned objects: `Int32(version) (FieldId Value)* ""` after the type id
//! and reference id.

use crate::error::Error;
use crate::meta::field::FieldTable;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::skip::skip_value;
use crate::serializer::ObjectSerializer;
use crate::types::FIELD_TERMINATOR;
use log::{debug, warn};

pub fn write_body<T: ObjectSerializer>(value: &T, context: &mut WriteContext) -> Result<(), Error> {
    let table = context.registry().fields_of::<T>()?;
    context.enter()?;
    value.braid_on_serializing();
    context.writer.write_i32(table.version());
    for field in table.fields() {
        context.writer.write_string(field.id())?;
        field.write(value, context)?;
    }
    context.writer.write_string(FIELD_TERMINATOR)?;
    context.leave();
    Ok(())
}

pub fn read_body<T: ObjectSerializer>(context: &mut ReadContext) -> Result<T, Error> {
    let mut value = T::braid_default();
    read_body_into(&mut value, context)?;
    Ok(value)
}

/// Reads the fields of an object into `value`, which keeps its current
/// state for every field the stream does not carry.
pub fn read_body_into<T: ObjectSerializer>(
    value: &mut T,
    context: &mut ReadContext,
) -> Result<(), Error> {
    let table = context.registry().fields_of::<T>()?;
    context.enter()?;
    let version = context.reader.read_i32()?;
    if version < table.min_supported_version() {
        return Err(Error::version_unsupported(format!(
            "`{}` version {version} is older than the minimum supported version {}",
            table.wire_id(),
            table.min_supported_version()
        )));
    }
    if version == table.version() {
        read_in_order(&table, value, context)?;
    } else {
        debug!(
            "reading `{}` version {version} tolerantly, current version is {}",
            table.wire_id(),
            table.version()
        );
        read_tolerant(&table, value, context)?;
    }
    context.leave();
    value.braid_on_deserialized(version);
    Ok(())
}

// Streams of the current version normally follow the compiled order. The
// first id that does not match hands over to the tolerant loop, so a field
// added without a version bump still reads older streams.
fn read_in_order<'a, T>(
    table: &FieldTable<T>,
    value: &mut T,
    context: &mut ReadContext<'a>,
) -> Result<(), Error> {
    for field in table.fields() {
        let id = context.reader.read_str()?;
        if id != field.id() {
            debug!(
                "`{}` expected field `{}`, found `{id}`, reading the rest tolerantly",
                table.wire_id(),
                field.id()
            );
            return read_fields_from(id, table, value, context);
        }
        field.read(value, context)?;
    }
    let terminator = context.reader.read_str()?;
    if terminator != FIELD_TERMINATOR {
        return read_fields_from(terminator, table, value, context);
    }
    Ok(())
}

fn read_tolerant<T>(
    table: &FieldTable<T>,
    value: &mut T,
    context: &mut ReadContext,
) -> Result<(), Error> {
    let id = context.reader.read_str()?;
    read_fields_from(id, table, value, context)
}

fn read_fields_from<'a, T>(
    mut id: &'a str,
    table: &FieldTable<T>,
    value: &mut T,
    context: &mut ReadContext<'a>,
) -> Result<(), Error> {
    while id != FIELD_TERMINATOR {
        match table.find(id) {
            Some(field) => field.read(value, context)?,
            None => {
                warn!("skipping unknown field `{id}` of `{}`", table.wire_id());
                skip_value(context)?;
            }
        }
        id = context.reader.read_str()?;
    }
    Ok(())
}
