//! Various utility types and functions.

pub mod pixfmt;
pub mod rect;
