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
use crate::serializer::Serializer;
use std::fmt::Display;

/// A fieldless enum carried on the wire as its `repr` integer.
///
/// Implemented by `#[derive(BraidObject)]` on enums.
pub trait BraidEnum: Sized + 'static {
    type Repr: Serializer + Copy + Display;

    fn to_repr(&self) -> Self::Repr;

    fn from_repr(repr: Self::Repr) -> Option<Self>;
}

#[inline(always)]
pub fn write_enum<E: BraidEnum>(value: &E, context: &mut WriteContext) -> Result<(), Error> {
    value.to_repr().braid_write_body(context)
}

pub fn read_enum<E: BraidEnum>(context: &mut ReadContext) -> Result<E, Error> {
    let repr = E::Repr::braid_read_body(context)?;
    E::from_repr(repr).ok_or_else(|| {
        Error::unknown_enum(format!(
            "{repr} is not a discriminant of `{}`",
            std::any::type_name::<E>()
        ))
    })
}
