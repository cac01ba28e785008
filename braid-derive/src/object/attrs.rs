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

//! Parsing of `#[braid(...)]` attributes.
//!
//! Type level:
//! - `type_id = "Person"`: declared wire id, also enables auto-registration
//! - `version = N`, `min_version = M`: current and oldest readable version
//! - `value`: the type carries no reference id
//! - `on_serializing = "path"`: `fn(&Self)` run before the version is written
//! - `on_deserialized = "path"`: `fn(&mut Self, i32)` run after the last field
//! - `declare = "path"`: `fn(&mut FieldDecls<Self>)` adding hand-written declarations
//!
//! Field level:
//! - `id = "name"`: field id on the wire
//! - `base`: embeds a base object whose fields are lifted into this type

use syn::{Attribute, ExprPath, Field, LitInt, LitStr};

#[derive(Default)]
pub struct TypeAttrs {
    pub type_id: Option<LitStr>,
    pub version: Option<i32>,
    pub min_version: Option<i32>,
    pub value: bool,
    pub on_serializing: Option<ExprPath>,
    pub on_deserialized: Option<ExprPath>,
    pub declare: Option<ExprPath>,
}

impl TypeAttrs {
    pub fn version(&self) -> i32 {
        self.version.unwrap_or(0)
    }

    pub fn min_version(&self) -> i32 {
        self.min_version.unwrap_or(0)
    }

    /// Whether any attribute other than `value` was given, for enums.
    pub fn has_object_options(&self) -> bool {
        self.type_id.is_some()
            || self.version.is_some()
            || self.min_version.is_some()
            || self.on_serializing.is_some()
            || self.on_deserialized.is_some()
            || self.declare.is_some()
    }
}

pub enum FieldRole {
    /// Not serialized.
    Skipped,
    Field(LitStr),
    Base,
}

fn parse_i32(nested: &syn::meta::ParseNestedMeta) -> syn::Result<i32> {
    let lit: LitInt = nested.value()?.parse()?;
    let value: i32 = lit.base10_parse()?;
    if value < 0 {
        return Err(syn::Error::new(lit.span(), "versions must be >= 0"));
    }
    Ok(value)
}

fn parse_path(nested: &syn::meta::ParseNestedMeta) -> syn::Result<ExprPath> {
    let lit: LitStr = nested.value()?.parse()?;
    lit.parse()
}

pub fn parse_type_attrs(attrs: &[Attribute]) -> syn::Result<TypeAttrs> {
    let mut parsed = TypeAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("braid") {
            continue;
        }
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("type_id") {
                parsed.type_id = Some(nested.value()?.parse()?);
            } else if nested.path.is_ident("version") {
                parsed.version = Some(parse_i32(&nested)?);
            } else if nested.path.is_ident("min_version") {
                parsed.min_version = Some(parse_i32(&nested)?);
            } else if nested.path.is_ident("value") {
                parsed.value = true;
            } else if nested.path.is_ident("on_serializing") {
                parsed.on_serializing = Some(parse_path(&nested)?);
            } else if nested.path.is_ident("on_deserialized") {
                parsed.on_deserialized = Some(parse_path(&nested)?);
            } else if nested.path.is_ident("declare") {
                parsed.declare = Some(parse_path(&nested)?);
            } else {
                return Err(nested.error("unknown braid type attribute"));
            }
            Ok(())
        })?;
    }
    if let (Some(version), Some(min_version)) = (parsed.version, parsed.min_version) {
        if version < min_version {
            return Err(syn::Error::new(
                proc_macro2::Span::call_site(),
                "version must not be below min_version",
            ));
        }
    }
    Ok(parsed)
}

pub fn parse_field_role(field: &Field) -> syn::Result<FieldRole> {
    let mut role = FieldRole::Skipped;
    for attr in &field.attrs {
        if !attr.path().is_ident("braid") {
            continue;
        }
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("id") {
                let lit: LitStr = nested.value()?.parse()?;
                if lit.value().is_empty() {
                    return Err(syn::Error::new(lit.span(), "field ids must not be empty"));
                }
                role = FieldRole::Field(lit);
            } else if nested.path.is_ident("base") {
                role = FieldRole::Base;
            } else {
                return Err(nested.error("unknown braid field attribute"));
            }
            Ok(())
        })?;
    }
    Ok(role)
}

/// Integer type named by `#[repr(..)]`, if any.
pub fn parse_repr(attrs: &[Attribute]) -> syn::Result<Option<syn::Ident>> {
    let mut repr = None;
    for attr in attrs {
        if !attr.path().is_ident("repr") {
            continue;
        }
        attr.parse_nested_meta(|nested| {
            if let Some(ident) = nested.path.get_ident() {
                const INTEGERS: [&str; 8] = ["i8", "u8", "i16", "u16", "i32", "u32", "i64", "u64"];
                if INTEGERS.contains(&ident.to_string().as_str()) {
                    repr = Some(ident.clone());
                }
            }
            Ok(())
        })?;
    }
    Ok(repr)
}
