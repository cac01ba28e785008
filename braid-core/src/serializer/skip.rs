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

//! Consuming values without materializing them.
//!
//! Used by the tolerant object reader for fields this build does not know.
//! The layout of a value is recovered from its type id alone.
//!
//! A shared value may be referenced again by a field the reader does know.
//! Values of reference kinds this build can decode are therefore read and
//! published under their reference id instead of being stepped over.

use crate::error::Error;
use crate::meta::type_grammar;
use crate::resolver::context::ReadContext;
use crate::resolver::type_registry::TypeDescriptor;
use crate::types::{ContainerKind, LeafWidth, TypeKind, ARRAY, NULL};
use log::debug;

/// Skips one full value, type id included.
pub fn skip_value(context: &mut ReadContext) -> Result<(), Error> {
    let type_id = context.read_type_id()?;
    skip_with_type_id(context, type_id)
}

/// Skips the rest of a value whose type id was already read.
pub fn skip_with_type_id(context: &mut ReadContext, type_id: &str) -> Result<(), Error> {
    if type_id == NULL {
        return context.read_null_ref();
    }
    if materialize(context, type_id) {
        return Ok(());
    }
    let parsed = type_grammar::parse(type_id)?;
    if parsed.base == ARRAY {
        let [element] = parsed.args.as_slice() else {
            return Err(Error::malformed_type_id(type_id.to_string()));
        };
        return skip_array(context, element);
    }
    if let Some(kind) = ContainerKind::from_token(parsed.base) {
        if parsed.args.len() != kind.arity() {
            return Err(Error::malformed_type_id(type_id.to_string()));
        }
        return skip_container(context, kind);
    }
    let descriptor = context.registry().resolve_by_id(parsed.base)?;
    skip_described(context, &descriptor)
}

// Reads the value as an `Rc` so a later back-reference finds it. Any failure
// is rolled back and the caller skips the value instead. Plain `Rc` values
// cannot close a cycle, so a skipped value containing one ends up here.
fn materialize(context: &mut ReadContext, type_id: &str) -> bool {
    let Ok(codec) = context.registry().codec_by_id(type_id) else {
        return false;
    };
    if !codec.is_reference() {
        return false;
    }
    let checkpoint = context.checkpoint();
    match codec.read_rc(context) {
        Ok(_) => true,
        Err(err) => {
            debug!("stepping over `{type_id}` instead of reading it: {err}");
            context.rollback(checkpoint);
            false
        }
    }
}

/// Reads a reference id. Returns false when it points back to a value seen
/// earlier, in which case no body follows.
fn skip_ref(context: &mut ReadContext) -> Result<bool, Error> {
    let ref_id = context.read_ref_id()?;
    if context.ref_reader.contains(ref_id) {
        return Ok(false);
    }
    context.ref_reader.add_skipped(ref_id)?;
    Ok(true)
}

fn skip_array(context: &mut ReadContext, element: &str) -> Result<(), Error> {
    if !skip_ref(context)? {
        return Ok(());
    }
    context.enter()?;
    let len = context.reader.read_len()?;
    let width = if context.config().is_value_array_fast_path() {
        fixed_width_of(context, element)
    } else {
        None
    };
    match width {
        Some(width) => {
            let total = width
                .checked_mul(len)
                .ok_or_else(|| Error::invalid_data(format!("array length {len} overflows")))?;
            context.reader.skip(total)?;
        }
        None => {
            for _ in 0..len {
                skip_value(context)?;
            }
        }
    }
    context.leave();
    Ok(())
}

// Arrays of fixed-width leaves were written as raw bodies. Anything that
// does not name a registered leaf went through the per-element path.
fn fixed_width_of(context: &ReadContext, element: &str) -> Option<usize> {
    if type_grammar::parse(element).ok()?.is_compound() {
        return None;
    }
    context
        .registry()
        .resolve_by_id(element)
        .ok()
        .and_then(|descriptor| descriptor.kind().fixed_width())
}

fn skip_container(context: &mut ReadContext, kind: ContainerKind) -> Result<(), Error> {
    if !skip_ref(context)? {
        return Ok(());
    }
    context.enter()?;
    let len = context.reader.read_len()?;
    let values = len
        .checked_mul(kind.arity())
        .ok_or_else(|| Error::invalid_data(format!("container length {len} overflows")))?;
    for _ in 0..values {
        skip_value(context)?;
    }
    context.leave();
    Ok(())
}

fn skip_described(context: &mut ReadContext, descriptor: &TypeDescriptor) -> Result<(), Error> {
    match descriptor.kind() {
        TypeKind::Leaf(LeafWidth::Fixed(width)) => context.reader.skip(width),
        TypeKind::Leaf(LeafWidth::Prefixed) => context.reader.skip_string(),
        TypeKind::Custom => match descriptor.skip_fn() {
            Some(skip) => skip(context),
            None => Err(Error::unsupported(format!(
                "type `{}` has no skip binding",
                descriptor.wire_id()
            ))),
        },
        TypeKind::Object { reference } => {
            if reference && !skip_ref(context)? {
                return Ok(());
            }
            skip_object_body(context)
        }
    }
}

fn skip_object_body(context: &mut ReadContext) -> Result<(), Error> {
    context.enter()?;
    // any version is acceptable here, the field loop is self-describing
    let _version = context.reader.read_i32()?;
    loop {
        let field_id = context.read_type_id()?;
        if field_id.is_empty() {
            break;
        }
        skip_value(context)?;
    }
    context.leave();
    Ok(())
}
