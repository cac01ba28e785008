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

//! Error type shared by every braid operation.
//!
//! Constructors are `#[cold]` and `#[track_caller]` so that the success paths of
//! buffer reads and type checks stay small after inlining. Always build errors
//! through the static constructor functions, never through the variants.

use std::borrow::Cow;

use thiserror::Error;

/// Set `BRAID_PANIC_ON_ERROR` at compile time to panic where an error is created.
pub const PANIC_ON_ERROR: bool = option_env!("BRAID_PANIC_ON_ERROR").is_some();

#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

/// Broad failure category of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A type or field declaration was rejected while registering.
    Registration,
    /// A type id or Rust type could not be resolved.
    Resolution,
    /// The value or the stream does not have a supported shape.
    Format,
    /// Reference bookkeeping is inconsistent with the stream.
    State,
    /// The underlying sink or source failed.
    Io,
}

/// Error type for braid registration, serialization and deserialization.
///
/// Do not construct variants directly. Use [`Error::duplicate_id`],
/// [`Error::invalid_data`] and the other constructors so that
/// `BRAID_PANIC_ON_ERROR` debugging works uniformly.
///
/// ```bash
/// RUST_BACKTRACE=1 BRAID_PANIC_ON_ERROR=1 cargo test
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("type id `{0}` is already registered")]
    DuplicateId(Cow<'static, str>),

    #[error("type `{0}` is already registered")]
    DuplicateType(Cow<'static, str>),

    #[error("type id `{0}` is reserved")]
    ReservedId(Cow<'static, str>),

    #[error("invalid type id `{0}`")]
    InvalidId(Cow<'static, str>),

    #[error("{0}")]
    InvalidVersion(Cow<'static, str>),

    #[error("field id `{id}` is declared twice in the hierarchy of `{type_name}`")]
    DuplicateFieldId {
        type_name: Cow<'static, str>,
        id: Cow<'static, str>,
    },

    #[error("member `{member}` of `{type_name}` needs both a read and a write accessor")]
    MissingAccessor {
        type_name: Cow<'static, str>,
        member: Cow<'static, str>,
    },

    #[error("{0}")]
    AccessorTypeMismatch(Cow<'static, str>),

    #[error("`{0}` is a generic instantiation, register its definition with `register_generic`")]
    ClosedGeneric(Cow<'static, str>),

    #[error("array type `{0}` cannot be registered, arrays share the reserved `array` id")]
    ArrayRegistration(Cow<'static, str>),

    #[error("{0}")]
    NotAllowed(Cow<'static, str>),

    #[error("{0}")]
    NotFound(Cow<'static, str>),

    #[error("type mismatch: expected `{expected}`, found `{actual}`")]
    TypeMismatch {
        expected: Cow<'static, str>,
        actual: Cow<'static, str>,
    },

    #[error("malformed type id `{0}`")]
    MalformedTypeId(Cow<'static, str>),

    #[error("{0}")]
    Unsupported(Cow<'static, str>),

    #[error("array lower bound must be zero, found {0}")]
    NonZeroLowerBound(i64),

    #[error("Buffer out of bound: {0} + {1} > {2}")]
    BufferOutOfBound(usize, usize, usize),

    #[error("{0}")]
    InvalidData(Cow<'static, str>),

    #[error("{0}")]
    UnknownEnum(Cow<'static, str>),

    #[error("{0}")]
    VersionUnsupported(Cow<'static, str>),

    #[error("{0}")]
    DepthExceed(Cow<'static, str>),

    #[error("{0}")]
    InvalidRef(Cow<'static, str>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

macro_rules! constructor {
    ($(#[$doc:meta])* $name:ident => $variant:ident) => {
        $(#[$doc])*
        #[inline(always)]
        #[cold]
        #[track_caller]
        pub fn $name<S: Into<Cow<'static, str>>>(s: S) -> Self {
            Error::$variant(s.into()).checked()
        }
    };
}

impl Error {
    #[inline(always)]
    #[track_caller]
    fn checked(self) -> Self {
        if PANIC_ON_ERROR {
            panic!("BRAID_PANIC_ON_ERROR: {}", self);
        }
        self
    }

    constructor!(duplicate_id => DuplicateId);
    constructor!(duplicate_type => DuplicateType);
    constructor!(reserved_id => ReservedId);
    constructor!(invalid_id => InvalidId);
    constructor!(invalid_version => InvalidVersion);
    constructor!(accessor_type_mismatch => AccessorTypeMismatch);
    constructor!(closed_generic => ClosedGeneric);
    constructor!(array_registration => ArrayRegistration);
    constructor!(not_allowed => NotAllowed);
    constructor!(
        /// An id or Rust type has no descriptor.
        not_found => NotFound
    );
    constructor!(malformed_type_id => MalformedTypeId);
    constructor!(unsupported => Unsupported);
    constructor!(
        /// Invalid or corrupted stream content.
        invalid_data => InvalidData
    );
    constructor!(unknown_enum => UnknownEnum);
    constructor!(version_unsupported => VersionUnsupported);
    constructor!(depth_exceed => DepthExceed);
    constructor!(
        /// A reference id that does not match the current scope.
        invalid_ref => InvalidRef
    );

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn duplicate_field_id<T, I>(type_name: T, id: I) -> Self
    where
        T: Into<Cow<'static, str>>,
        I: Into<Cow<'static, str>>,
    {
        Error::DuplicateFieldId {
            type_name: type_name.into(),
            id: id.into(),
        }
        .checked()
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn missing_accessor<T, M>(type_name: T, member: M) -> Self
    where
        T: Into<Cow<'static, str>>,
        M: Into<Cow<'static, str>>,
    {
        Error::MissingAccessor {
            type_name: type_name.into(),
            member: member.into(),
        }
        .checked()
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<Cow<'static, str>>,
        A: Into<Cow<'static, str>>,
    {
        Error::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
        .checked()
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn buffer_out_of_bound(offset: usize, length: usize, capacity: usize) -> Self {
        Error::BufferOutOfBound(offset, length, capacity).checked()
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn non_zero_lower_bound(lower_bound: i64) -> Self {
        Error::NonZeroLowerBound(lower_bound).checked()
    }

    /// Maps the error onto its failure category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicateId(_)
            | Error::DuplicateType(_)
            | Error::ReservedId(_)
            | Error::InvalidId(_)
            | Error::InvalidVersion(_)
            | Error::DuplicateFieldId { .. }
            | Error::MissingAccessor { .. }
            | Error::AccessorTypeMismatch(_)
            | Error::ClosedGeneric(_)
            | Error::ArrayRegistration(_)
            | Error::NotAllowed(_) => ErrorKind::Registration,
            Error::NotFound(_) | Error::TypeMismatch { .. } => ErrorKind::Resolution,
            Error::MalformedTypeId(_)
            | Error::Unsupported(_)
            | Error::NonZeroLowerBound(_)
            | Error::BufferOutOfBound(..)
            | Error::InvalidData(_)
            | Error::UnknownEnum(_)
            | Error::VersionUnsupported(_)
            | Error::DepthExceed(_) => ErrorKind::Format,
            Error::InvalidRef(_) => ErrorKind::State,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Appends the Rust type name to a data error raised while reading `T`.
    #[inline(never)]
    pub fn enhance_type_error<T: ?Sized + 'static>(err: Error) -> Error {
        if let Error::InvalidData(s) = err {
            let mut msg = s.to_string();
            msg.push_str(" (type: ");
            msg.push_str(std::any::type_name::<T>());
            msg.push(')');
            Error::invalid_data(msg)
        } else {
            err
        }
    }
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::invalid_data($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::invalid_data(format!($fmt, $($arg)*)));
        }
    };
}

#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::error::Error::invalid_data($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::invalid_data(format!($fmt, $($arg)*)))
    };
}

#[macro_export]
macro_rules! not_allowed {
    ($err:expr) => {
        return Err($crate::error::Error::not_allowed($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::not_allowed(format!($fmt, $($arg)*)))
    };
}
