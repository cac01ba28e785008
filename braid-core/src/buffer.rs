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

//! Little-endian fixed-width primitive layer.
//!
//! Every composite encoding in braid is a sequence of these primitives. Reads
//! are bounds checked and never panic on short or hostile input.

use crate::bail;
use crate::error::Error;
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use std::cell::RefCell;

#[derive(Default)]
pub struct Writer {
    pub(crate) bf: Vec<u8>,
}

impl Writer {
    pub fn with_capacity(capacity: usize) -> Writer {
        Writer {
            bf: Vec::with_capacity(capacity),
        }
    }

    pub fn reset(&mut self) {
        // keep capacity and reset len to 0
        self.bf.clear();
    }

    pub fn dump(&self) -> Vec<u8> {
        self.bf.clone()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bf
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.bf.reserve(additional);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.bf.push(value as u8);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bf.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.bf.push(value as u8);
    }

    pub fn write_u16(&mut self, value: u16) {
        let _ = self.bf.write_u16::<LittleEndian>(value);
    }

    pub fn write_i16(&mut self, value: i16) {
        let _ = self.bf.write_i16::<LittleEndian>(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        let _ = self.bf.write_u32::<LittleEndian>(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        let _ = self.bf.write_i32::<LittleEndian>(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        let _ = self.bf.write_u64::<LittleEndian>(value);
    }

    pub fn write_i64(&mut self, value: i64) {
        let _ = self.bf.write_i64::<LittleEndian>(value);
    }

    pub fn write_u128(&mut self, value: u128) {
        let _ = self.bf.write_u128::<LittleEndian>(value);
    }

    pub fn write_i128(&mut self, value: i128) {
        let _ = self.bf.write_i128::<LittleEndian>(value);
    }

    pub fn write_f32(&mut self, value: f32) {
        let _ = self.bf.write_f32::<LittleEndian>(value);
    }

    pub fn write_f64(&mut self, value: f64) {
        let _ = self.bf.write_f64::<LittleEndian>(value);
    }

    pub fn write_char(&mut self, value: char) {
        self.write_u32(value as u32);
    }

    /// Writes a length-prefixed UTF-8 string. The empty string is a bare `Int32(0)`.
    pub fn write_string(&mut self, s: &str) -> Result<(), Error> {
        let len = i32::try_from(s.len())
            .map_err(|_| Error::unsupported(format!("string of {} bytes is too long", s.len())))?;
        self.write_i32(len);
        self.bf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    /// Writes a collection length as `Int32`.
    pub fn write_len(&mut self, len: usize) -> Result<(), Error> {
        let len = i32::try_from(len)
            .map_err(|_| Error::unsupported(format!("length {len} does not fit the wire")))?;
        self.write_i32(len);
        Ok(())
    }
}

pub struct Reader<'a> {
    bf: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bf: &'a [u8]) -> Reader<'a> {
        Reader { bf, cursor: 0 }
    }

    pub fn get_cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.bf.len() - self.cursor
    }

    /// Moves back to a position returned by [`Reader::get_cursor`].
    pub(crate) fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.bf.len());
    }

    #[inline(always)]
    fn check_bound(&self, n: usize) -> Result<(), Error> {
        if self.cursor + n > self.bf.len() {
            return Err(Error::buffer_out_of_bound(self.cursor, n, self.bf.len()));
        }
        Ok(())
    }

    #[inline(always)]
    fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        self.check_bound(n)?;
        let slice = &self.bf[self.cursor..self.cursor + n];
        self.cursor += n;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), Error> {
        self.check_bound(len)?;
        self.cursor += len;
        Ok(())
    }

    pub fn read_bool(&mut self) -> Result<bool, Error> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => bail!("invalid bool byte {}", other),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, Error> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16, Error> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32, Error> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    pub fn read_i64(&mut self) -> Result<i64, Error> {
        Ok(LittleEndian::read_i64(self.take(8)?))
    }

    pub fn read_u128(&mut self) -> Result<u128, Error> {
        Ok(LittleEndian::read_u128(self.take(16)?))
    }

    pub fn read_i128(&mut self) -> Result<i128, Error> {
        Ok(LittleEndian::read_i128(self.take(16)?))
    }

    pub fn read_f32(&mut self) -> Result<f32, Error> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        Ok(LittleEndian::read_f64(self.take(8)?))
    }

    pub fn read_char(&mut self) -> Result<char, Error> {
        let raw = self.read_u32()?;
        char::from_u32(raw).ok_or_else(|| Error::invalid_data(format!("invalid char {raw:#x}")))
    }

    /// Reads a length-prefixed string borrowed from the input.
    pub fn read_str(&mut self) -> Result<&'a str, Error> {
        let len = self.read_len()?;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes).map_err(|e| Error::invalid_data(format!("invalid utf8: {e}")))
    }

    pub fn read_len(&mut self) -> Result<usize, Error> {
        let len = self.read_i32()?;
        usize::try_from(len).map_err(|_| Error::invalid_data(format!("negative length {len}")))
    }

    pub fn skip_string(&mut self) -> Result<(), Error> {
        let len = self.read_len()?;
        self.skip(len)
    }
}

thread_local! {
    static SCRATCH: RefCell<Option<Writer>> = RefCell::new(Some(Writer::with_capacity(256)));
}

/// Runs `f` with this thread's scratch writer.
///
/// Reentrant calls on the same thread get a fresh writer, since the scratch
/// slot is held by the outermost caller until it returns.
pub fn with_scratch<R>(f: impl FnOnce(&mut Writer) -> R) -> R {
    let taken = SCRATCH.with(|slot| slot.borrow_mut().take());
    match taken {
        Some(mut writer) => {
            writer.reset();
            let result = f(&mut writer);
            writer.reset();
            SCRATCH.with(|slot| *slot.borrow_mut() = Some(writer));
            result
        }
        None => f(&mut Writer::default()),
    }
}
