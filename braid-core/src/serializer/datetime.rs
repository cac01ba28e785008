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

use crate::ensure;
use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::{BraidDefault, Serializer};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

// Microseconds since the Unix epoch, read as UTC.
impl Serializer for NaiveDateTime {
    fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
        let dt = self.and_utc();
        let micros = dt.timestamp() * 1_000_000 + dt.timestamp_subsec_micros() as i64;
        context.writer.write_i64(micros);
        Ok(())
    }

    fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
        let micros = context.reader.read_i64()?;
        NaiveDateTime::default()
            .checked_add_signed(TimeDelta::microseconds(micros))
            .ok_or_else(|| Error::invalid_data(format!("timestamp {micros} is out of range")))
    }

    fn braid_type_id_dyn(&self, registry: &TypeRegistry) -> Result<Arc<str>, Error> {
        registry.type_id_of::<Self>()
    }

    fn braid_fixed_width() -> Option<usize> {
        Some(8)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl BraidDefault for NaiveDateTime {
    fn braid_default() -> Self {
        NaiveDateTime::default()
    }
}

// Days since 1970-01-01.
impl Serializer for NaiveDate {
    fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
        let days = self.signed_duration_since(NaiveDate::default()).num_days();
        let days = i32::try_from(days)
            .map_err(|_| Error::unsupported(format!("date {self} is out of range")))?;
        context.writer.write_i32(days);
        Ok(())
    }

    fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
        let days = context.reader.read_i32()?;
        NaiveDate::default()
            .checked_add_signed(TimeDelta::days(days as i64))
            .ok_or_else(|| Error::invalid_data(format!("date offset {days} is out of range")))
    }

    fn braid_type_id_dyn(&self, registry: &TypeRegistry) -> Result<Arc<str>, Error> {
        registry.type_id_of::<Self>()
    }

    fn braid_fixed_width() -> Option<usize> {
        Some(4)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl BraidDefault for NaiveDate {
    fn braid_default() -> Self {
        NaiveDate::default()
    }
}

impl Serializer for Duration {
    fn braid_write_body(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.writer.write_u64(self.as_secs());
        context.writer.write_u32(self.subsec_nanos());
        Ok(())
    }

    fn braid_read_body(context: &mut ReadContext) -> Result<Self, Error> {
        let secs = context.reader.read_u64()?;
        let nanos = context.reader.read_u32()?;
        ensure!(nanos < 1_000_000_000, "{} nanoseconds overflow a second", nanos);
        Ok(Duration::new(secs, nanos))
    }

    fn braid_type_id_dyn(&self, registry: &TypeRegistry) -> Result<Arc<str>, Error> {
        registry.type_id_of::<Self>()
    }

    fn braid_fixed_width() -> Option<usize> {
        Some(12)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl BraidDefault for Duration {
    fn braid_default() -> Self {
        Duration::ZERO
    }
}
