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
use crate::types::{FIRST_REF, NULL_REF};
use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// Write side of a reference scope.
///
/// RefWriter maps the allocation address of every shared value written in the
/// current call to the reference id it was first written under. Owned values
/// that can never be seen twice take a fresh id through [`RefWriter::next_owned_id`]
/// so that the id sequence on the wire stays dense.
///
/// # Examples
///
/// ```rust
/// use braid_core::resolver::ref_resolver::RefWriter;
/// use std::rc::Rc;
///
/// let mut refs = RefWriter::new();
/// let shared = Rc::new(42);
/// let address = Rc::as_ptr(&shared) as *const () as usize;
///
/// assert_eq!(refs.get_or_create_id(Some(address)), (1, true));
/// assert_eq!(refs.get_or_create_id(Some(address)), (1, false));
/// assert_eq!(refs.get_or_create_id(None), (0, false));
/// ```
pub struct RefWriter {
    refs: HashMap<usize, i32>,
    next_ref_id: i32,
}

impl Default for RefWriter {
    fn default() -> Self {
        RefWriter {
            refs: HashMap::new(),
            next_ref_id: FIRST_REF,
        }
    }
}

impl RefWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `(id, created)` for the value at `address`.
    ///
    /// `None` is null and maps to `(0, false)` without touching the table.
    /// `created` is true only the first time an address is seen in this scope,
    /// which is when the caller must write the value's body.
    pub fn get_or_create_id(&mut self, address: Option<usize>) -> (i32, bool) {
        let Some(address) = address else {
            return (NULL_REF, false);
        };
        if let Some(&ref_id) = self.refs.get(&address) {
            return (ref_id, false);
        }
        let ref_id = self.next_owned_id();
        self.refs.insert(address, ref_id);
        (ref_id, true)
    }

    /// Hands out the next id without recording an identity.
    pub fn next_owned_id(&mut self) -> i32 {
        let ref_id = self.next_ref_id;
        self.next_ref_id += 1;
        ref_id
    }

    /// Clears the scope. Called when the outermost write completes.
    pub fn reset(&mut self) {
        self.refs.clear();
        self.next_ref_id = FIRST_REF;
    }
}

/// What the read scope remembers about a reference id.
enum RefSlot {
    Rc(Rc<dyn Any>),
    Arc(Arc<dyn Any + Send + Sync>),
    /// Read into an owned value; it cannot be referenced again.
    Owned,
    /// Consumed by the tolerant reader without being materialized.
    Skipped,
    /// Id reserved while the value's body is still being read.
    Pending,
}

/// Read side of a reference scope.
///
/// Ids must arrive in the order the writer assigned them. A value is added
/// under its id before its fields are read, so a back-reference found while
/// reading those fields resolves to the value being populated.
pub struct RefReader {
    refs: HashMap<i32, RefSlot>,
    next_ref_id: i32,
}

impl Default for RefReader {
    fn default() -> Self {
        RefReader {
            refs: HashMap::new(),
            next_ref_id: FIRST_REF,
        }
    }
}

impl RefReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `ref_id` was already added in this scope.
    pub fn contains(&self, ref_id: i32) -> bool {
        self.refs.contains_key(&ref_id)
    }

    fn insert(&mut self, ref_id: i32, slot: RefSlot) -> Result<(), Error> {
        if ref_id != self.next_ref_id {
            return Err(Error::invalid_ref(format!(
                "reference id {ref_id} is out of order, expected {}",
                self.next_ref_id
            )));
        }
        self.next_ref_id += 1;
        self.refs.insert(ref_id, slot);
        Ok(())
    }

    pub fn add_rc(&mut self, ref_id: i32, value: Rc<dyn Any>) -> Result<(), Error> {
        self.insert(ref_id, RefSlot::Rc(value))
    }

    pub fn add_arc(&mut self, ref_id: i32, value: Arc<dyn Any + Send + Sync>) -> Result<(), Error> {
        self.insert(ref_id, RefSlot::Arc(value))
    }

    pub fn add_owned(&mut self, ref_id: i32) -> Result<(), Error> {
        self.insert(ref_id, RefSlot::Owned)
    }

    pub fn add_skipped(&mut self, ref_id: i32) -> Result<(), Error> {
        self.insert(ref_id, RefSlot::Skipped)
    }

    /// Claims `ref_id` for a value that can only be built after its body is read.
    pub fn reserve(&mut self, ref_id: i32) -> Result<(), Error> {
        self.insert(ref_id, RefSlot::Pending)
    }

    /// Publishes a value under an id claimed with [`RefReader::reserve`].
    pub fn fill_rc(&mut self, ref_id: i32, value: Rc<dyn Any>) -> Result<(), Error> {
        self.fill(ref_id, RefSlot::Rc(value))
    }

    pub fn fill_arc(&mut self, ref_id: i32, value: Arc<dyn Any + Send + Sync>) -> Result<(), Error> {
        self.fill(ref_id, RefSlot::Arc(value))
    }

    fn fill(&mut self, ref_id: i32, slot: RefSlot) -> Result<(), Error> {
        match self.refs.get_mut(&ref_id) {
            Some(pending @ RefSlot::Pending) => {
                *pending = slot;
                Ok(())
            }
            _ => Err(Error::invalid_ref(format!(
                "reference id {ref_id} was not reserved"
            ))),
        }
    }

    /// Looks up a shared `Rc` value added earlier in this scope.
    ///
    /// Returns `Ok(None)` for an id not seen yet, which the caller must treat
    /// as a first occurrence. Ids that name an owned or skipped value, or a
    /// value of another pointer kind, are errors.
    pub fn try_get_rc(&self, ref_id: i32) -> Result<Option<Rc<dyn Any>>, Error> {
        match self.refs.get(&ref_id) {
            None => Ok(None),
            Some(RefSlot::Rc(value)) => Ok(Some(value.clone())),
            Some(slot) => Err(Self::slot_error(ref_id, slot)),
        }
    }

    pub fn try_get_arc(&self, ref_id: i32) -> Result<Option<Arc<dyn Any + Send + Sync>>, Error> {
        match self.refs.get(&ref_id) {
            None => Ok(None),
            Some(RefSlot::Arc(value)) => Ok(Some(value.clone())),
            Some(slot) => Err(Self::slot_error(ref_id, slot)),
        }
    }

    #[cold]
    fn slot_error(ref_id: i32, slot: &RefSlot) -> Error {
        let what = match slot {
            RefSlot::Rc(_) => "an Rc value",
            RefSlot::Arc(_) => "an Arc value",
            RefSlot::Owned => "an owned value",
            RefSlot::Skipped => "a skipped value",
            RefSlot::Pending => "a value that is not registered yet",
        };
        Error::invalid_ref(format!(
            "reference id {ref_id} points to {what} and cannot be shared here"
        ))
    }

    /// Id the next new value must carry.
    pub fn next_id(&self) -> i32 {
        self.next_ref_id
    }

    /// Forgets every id from `next_ref_id` on.
    pub fn truncate(&mut self, next_ref_id: i32) {
        self.refs.retain(|&ref_id, _| ref_id < next_ref_id);
        self.next_ref_id = next_ref_id;
    }

    /// Clears the scope. Called when the outermost read completes.
    pub fn reset(&mut self) {
        self.refs.clear();
        self.next_ref_id = FIRST_REF;
    }
}
