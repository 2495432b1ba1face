//! Rendering statistics.

use alloc::{format, string::String};
use core::fmt::{self, Display, Formatter};
use core::ops::AddAssign;

//
// Types
//

/// Collects and accumulates rendering statistics.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Number of draw calls issued: `begin`/`end` brackets and array draws.
    pub calls: usize,

    /// Primitives assembled / rasterized after culling and clipping.
    pub prims: Throughput,
    /// Vertices submitted / emitted by the clipper.
    pub verts: Throughput,
    /// Fragments generated / written to the framebuffer.
    pub frags: Throughput,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Throughput {
    // Count of items submitted for rendering.
    pub i: usize,
    // Count of items output to the render target.
    pub o: usize,
}

//
// Impls
//

impl Stats {
    /// Creates a new zeroed `Stats` instance.
    pub fn new() -> Self {
        Self::default()
    }

    fn throughput(&self) -> [Throughput; 3] {
        [self.prims, self.verts, self.frags]
    }
}

impl Display for Stats {
    #[rustfmt::skip]
    #[inline(never)]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let w = f.width().unwrap_or(16);
        write!(f,
            " STATS  {:>w$}\n\
             ────────{empty:─>w$}─\n \
              calls  {:>w$}\n\
             ────────{empty:─>w$}─\n",
            "TOTAL",
            self.calls,
            empty = ""
        )?;

        let labels = ["prims", "verts", "frags"];
        for (tot, lbl) in self.throughput().into_iter().zip(labels) {
            if f.alternate() {
                writeln!(f, " {lbl:6} {tot:#w$}")?;
            } else {
                writeln!(f, " {lbl:6} {tot:w$}")?;
            }
        }
        Ok(())
    }
}

impl Display for Throughput {
    #[inline(never)]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let &Self { i, o } = self;
        let w = f.width().unwrap_or(10);
        if f.alternate() {
            if i == 0 {
                write!(f, "{:>w$}", "--")
            } else {
                let pct = 100.0 * o as f32 / i as f32;
                write!(f, "{pct:>w$.1}%", w = w - 1)
            }
        } else {
            let io = format!("{} / {}", human_num(i), human_num(o));
            write!(f, "{io:>w$}")
        }
    }
}

impl AddAssign for Stats {
    /// Appends the stats of `other` to `self`.
    fn add_assign(&mut self, other: Self) {
        self.calls += other.calls;
        self.prims += other.prims;
        self.verts += other.verts;
        self.frags += other.frags;
    }
}

impl AddAssign for Throughput {
    fn add_assign(&mut self, rhs: Self) {
        self.i += rhs.i;
        self.o += rhs.o;
    }
}

#[inline(never)]
fn human_num(n: usize) -> String {
    if n < 1_000 {
        format!("{n:5}")
    } else if n < 100_000 {
        format!("{:4.1}k", n as f32 / 1_000.)
    } else if n < 1_000_000 {
        format!("{:4}k", n / 1_000)
    } else if n < 100_000_000 {
        format!("{:4.1}M", n as f32 / 1_000_000.)
    } else if n < 1_000_000_000 {
        format!("{:4}M", n / 1_000_000)
    } else if (n as u64) < 100_000_000_000 {
        format!("{:4.1}G", n as f32 / 1_000_000_000.)
    } else {
        format!("{n:5.1e}")
    }
}
