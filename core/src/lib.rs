//! ```text
//!                  __ _             __
//!       ______ ___/ _| |_ __ _  __/ /
//!      (_-< _ \  _|  _/ _` |/ _` / /
//!     /__/\___/_|  \__\__, |\__,_/_/
//!                     |___/
//! ```
//!
//! Core of the `softgl` project: a fixed-function 3D rendering pipeline in
//! software.
//!
//! The pipeline transforms, clips, projects, rasterizes, textures, blends,
//! and depth-tests points, lines, triangles and quads submitted through an
//! immediate-mode [`Context`][ctx::Context] API in the vocabulary of the
//! classic fixed-function graphics libraries. No graphics hardware is
//! involved; the output is an in-memory framebuffer.
//!
//! # Crate features
//!
//! * `std`:
//!   Uses the floating-point functions of the standard library. Enabled by
//!   default. If this feature is disabled, the crate only depends on
//!   `alloc`.
//!
//! * `libm`:
//!   Provides software implementations of floating-point functions via the
//!   [libm](https://crates.io/crates/libm) crate.
//!
//! * `mm`:
//!   Provides fast approximate implementations of floating-point functions
//!   via the [micromath](https://crates.io/crates/micromath) crate.
//!
//! Without any of these, the trigonometric functions needed by
//! [`Context::rotate`][ctx::Context::rotate] are unavailable.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;
extern crate core;

pub mod config;
pub mod ctx;
pub mod error;
pub mod math;
pub mod pool;
pub mod render;
pub mod util;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::ctx::{
        Array, Capability, ClearMask, Context, FloatParam, MatrixMode,
        StringName,
    };
    pub use crate::error::Error;
    pub use crate::math::{Color4f, rgba};
    pub use crate::render::{
        Face, PolygonMode, PrimitiveKind, blend::BlendFactor, stats::Stats,
        tex::{Filter, TexParam, Wrap},
    };
    pub use crate::util::{
        pixfmt::{ColorFormat, DepthFormat, PixelFormat, PixelType},
        rect::Rect,
    };
}
