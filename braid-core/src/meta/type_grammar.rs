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

//! Compound type-id grammar.
//!
//! ```text
//! id       := base | base "[" id ("," id)* "]"
//! base     := token without any of []()<>
//! ```
//!
//! Arrays encode as `array[elem]`, containers as `map[key,value]` and generic
//! user types as `pair[a,b]`. Arguments are split at top-level commas only,
//! so `base[outer[inner],other]` has the two arguments `outer[inner]` and
//! `other`.

use crate::error::Error;
use crate::types::{RESERVED_CHARS, RESERVED_TOKENS};

/// A parsed type id, borrowing from the source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundTypeId<'a> {
    pub base: &'a str,
    pub args: Vec<&'a str>,
}

impl CompoundTypeId<'_> {
    pub fn is_compound(&self) -> bool {
        !self.args.is_empty()
    }
}

/// Builds `base[arg1,arg2,...]`, or `base` when there are no arguments.
pub fn encode<S: AsRef<str>>(base: &str, args: &[S]) -> String {
    if args.is_empty() {
        return base.to_string();
    }
    let len = base.len() + 2 + args.iter().map(|a| a.as_ref().len() + 1).sum::<usize>();
    let mut id = String::with_capacity(len);
    id.push_str(base);
    id.push('[');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            id.push(',');
        }
        id.push_str(arg.as_ref());
    }
    id.push(']');
    id
}

pub fn parse(id: &str) -> Result<CompoundTypeId<'_>, Error> {
    let Some(open) = id.find('[') else {
        if id.is_empty() || id.contains(&RESERVED_CHARS[..]) {
            return Err(Error::malformed_type_id(id.to_string()));
        }
        return Ok(CompoundTypeId {
            base: id,
            args: Vec::new(),
        });
    };
    let base = &id[..open];
    if base.is_empty() || base.contains(&RESERVED_CHARS[..]) || !id.ends_with(']') {
        return Err(Error::malformed_type_id(id.to_string()));
    }
    let inner = &id[open + 1..id.len() - 1];
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                // a close at depth 0 would end the argument list early
                if depth == 0 {
                    return Err(Error::malformed_type_id(id.to_string()));
                }
                depth -= 1;
            }
            ',' if depth == 0 => {
                args.push(&inner[start..i]);
                start = i + 1;
            }
            '(' | ')' | '<' | '>' => return Err(Error::malformed_type_id(id.to_string())),
            _ => {}
        }
    }
    if depth != 0 {
        return Err(Error::malformed_type_id(id.to_string()));
    }
    args.push(&inner[start..]);
    if args.iter().any(|a| a.is_empty()) {
        return Err(Error::malformed_type_id(id.to_string()));
    }
    Ok(CompoundTypeId { base, args })
}

/// Checks a user supplied id before it is registered.
pub fn validate_token(id: &str) -> Result<(), Error> {
    if id.is_empty() || id.contains(&RESERVED_CHARS[..]) {
        return Err(Error::invalid_id(id.to_string()));
    }
    if RESERVED_TOKENS.contains(&id) {
        return Err(Error::reserved_id(id.to_string()));
    }
    Ok(())
}
