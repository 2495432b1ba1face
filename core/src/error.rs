//! Error taxonomy of the pipeline API.
//!
//! Errors are never fatal: a failing entry point records one [`Error`]
//! in the context's sticky error slot and returns without side effects.
//! Degenerate but valid input, such as a zero-area triangle, is not an
//! error and is silently dropped instead.

use thiserror::Error;

/// An error recorded by a [`Context`][crate::ctx::Context] entry point.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// An enumerated argument was not one of the accepted tokens.
    #[error("invalid enum")]
    InvalidEnum,
    /// A numeric argument was out of range.
    #[error("invalid value")]
    InvalidValue,
    /// The operation is not allowed in the current state.
    #[error("invalid operation")]
    InvalidOperation,
    /// A matrix stack push beyond capacity, or out of texture ids.
    #[error("stack overflow")]
    StackOverflow,
    /// A matrix stack pop at the bottom of the stack.
    #[error("stack underflow")]
    StackUnderflow,
}

impl Error {
    /// Returns the classic numeric code of `self`.
    pub const fn code(self) -> u32 {
        match self {
            Self::InvalidEnum => 0x0500,
            Self::InvalidValue => 0x0501,
            Self::InvalidOperation => 0x0502,
            Self::StackOverflow => 0x0503,
            Self::StackUnderflow => 0x0504,
        }
    }
}

impl TryFrom<u32> for Error {
    type Error = u32;

    /// Returns the error with the numeric code `code`, or the code
    /// itself if it is not a known error code.
    fn try_from(code: u32) -> Result<Self, u32> {
        Ok(match code {
            0x0500 => Self::InvalidEnum,
            0x0501 => Self::InvalidValue,
            0x0502 => Self::InvalidOperation,
            0x0503 => Self::StackOverflow,
            0x0504 => Self::StackUnderflow,
            other => return Err(other),
        })
    }
}

/// A sticky error slot: keeps the first error recorded since the last
/// [`take`][Self::take].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorSlot(Option<Error>);

impl ErrorSlot {
    /// Records `err` unless an earlier error is still pending.
    pub fn record(&mut self, op: &str, err: Error) {
        log::debug!("{op}: {err}");
        self.0.get_or_insert(err);
    }
    /// Returns the pending error, if any, and clears the slot.
    pub fn take(&mut self) -> Option<Error> {
        self.0.take()
    }
}

/// An enumerated argument, given either as a typed value or as its raw
/// numeric token.
pub trait Token<T> {
    /// Returns `self` as a `T`.
    ///
    /// # Errors
    /// [`Error::InvalidEnum`] if `self` is a raw token not valid for `T`.
    fn token(self) -> Result<T, Error>;
}

impl<T: TryFrom<u32, Error = Error>> Token<T> for u32 {
    fn token(self) -> Result<T, Error> {
        self.try_into()
    }
}

/// Defines a `u32`-tokenized enum with a `TryFrom<u32>` conversion that
/// maps unknown tokens to [`Error::InvalidEnum`].
macro_rules! tokens {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $var:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $var ),+
        }

        impl $name {
            /// Returns the numeric token of `self`.
            pub const fn to_raw(self) -> u32 {
                match self {
                    $( Self::$var => $val ),+
                }
            }
        }

        impl TryFrom<u32> for $name {
            type Error = $crate::error::Error;

            fn try_from(raw: u32) -> Result<Self, Self::Error> {
                match raw {
                    $( $val => Ok(Self::$var), )+
                    _ => Err($crate::error::Error::InvalidEnum),
                }
            }
        }

        impl $crate::error::Token<$name> for $name {
            fn token(self) -> Result<Self, $crate::error::Error> {
                Ok(self)
            }
        }
    };
}
pub(crate) use tokens;
