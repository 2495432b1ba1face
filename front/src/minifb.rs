//! Frontend using the `minifb` crate for window creation and event handling.

use std::{
    ops::ControlFlow::{self, Break},
    time::Instant,
};

use minifb::{Key, WindowOptions};

use softgl_core::{
    ctx::Context,
    util::pixfmt::{PixelFormat, PixelType},
};

use crate::{Dims, Frame, rgba_to_xrgb, dims::SVGA_800_600};

/// A lightweight wrapper of a `minifb` window.
pub struct Window {
    /// The wrapped minifb window.
    pub imp: minifb::Window,
    /// The width and height of the window.
    pub dims: Dims,
    /// Readback buffer, BGRA bytes.
    bytes: Vec<u8>,
    /// Presented pixels, `0x00_RR_GG_BB`.
    pixels: Vec<u32>,
}

/// Builder for creating `Window`s.
pub struct Builder<'title> {
    pub dims: Dims,
    pub title: &'title str,
    pub target_fps: Option<u32>,
    pub opts: WindowOptions,
}

impl Default for Builder<'_> {
    fn default() -> Self {
        Self {
            dims: SVGA_800_600,
            title: "// softgl application //",
            target_fps: Some(60),
            opts: WindowOptions::default(),
        }
    }
}

impl<'t> Builder<'t> {
    /// Sets the width and height of the window.
    pub fn dims(mut self, dims: Dims) -> Self {
        self.dims = dims;
        self
    }
    /// Sets the title of the window.
    pub fn title(mut self, title: &'t str) -> Self {
        self.title = title;
        self
    }
    /// Sets the frame rate cap of the window. `None` means unlimited
    /// frame rate (the main loop runs as fast as possible).
    pub fn target_fps(mut self, fps: Option<u32>) -> Self {
        self.target_fps = fps;
        self
    }
    /// Sets other `minifb` options.
    pub fn options(mut self, opts: WindowOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Creates the window.
    pub fn build(self) -> minifb::Result<Window> {
        let Self { dims, title, target_fps, opts } = self;
        let (w, h) = (dims.0 as usize, dims.1 as usize);
        let mut imp = minifb::Window::new(title, w, h, opts)?;
        if let Some(fps) = target_fps {
            imp.set_target_fps(fps as usize);
        }
        log::info!("opened {w}x{h} window \"{title}\"");
        Ok(Window {
            imp,
            dims,
            bytes: vec![0; 4 * w * h],
            pixels: vec![0; w * h],
        })
    }
}

impl Window {
    /// Returns a window builder.
    pub fn builder() -> Builder<'static> {
        Builder::default()
    }

    /// Returns a context whose framebuffer matches the window size.
    pub fn context<'c>(&self) -> Context<'c> {
        let (w, h) = self.dims;
        Context::new(w, h, Default::default())
    }

    /// Updates the window content with the color buffer of `ctx`.
    ///
    /// The color buffer is read back in RGBA order and flipped, as the
    /// framebuffer is stored bottom-up. Errors in the readback, such as a
    /// framebuffer smaller than the window, are recorded in `ctx`.
    pub fn present(&mut self, ctx: &mut Context) -> minifb::Result<()> {
        let (w, h) = self.dims;
        ctx.read_pixels(
            0,
            0,
            w as i32,
            h as i32,
            PixelFormat::Rgba,
            PixelType::UnsignedByte,
            &mut self.bytes,
        );
        rgba_to_xrgb(&self.bytes, w as usize, &mut self.pixels);
        self.imp
            .update_with_buffer(&self.pixels, w as usize, h as usize)
    }

    /// Runs the main loop of the program, invoking the callback on each
    /// iteration to compute and draw the next frame.
    ///
    /// The main loop stops and this function returns if:
    /// * the user closes the window via the GUI (e.g. titlebar close button);
    /// * the Esc key is pressed; or
    /// * the callback returns `ControlFlow::Break`.
    pub fn run<'c, F>(
        &mut self,
        ctx: &mut Context<'c>,
        mut frame_fn: F,
    ) -> minifb::Result<()>
    where
        F: FnMut(&mut Frame<'_, 'c, Self>) -> ControlFlow<()>,
    {
        let start = Instant::now();
        let mut last = Instant::now();
        let mut frames = 0u64;
        loop {
            if self.should_quit() {
                break;
            }
            let frame = &mut Frame {
                t: start.elapsed(),
                dt: last.elapsed(),
                win: self,
                ctx,
            };
            last = Instant::now();
            if let Break(_) = frame_fn(frame) {
                break;
            }
            self.present(ctx)?;
            frames += 1;
        }
        let secs = start.elapsed().as_secs_f32();
        log::info!(
            "{frames} frames in {secs:.1}s, {:.1} fps\n{}",
            frames as f32 / secs,
            ctx.stats()
        );
        Ok(())
    }

    fn should_quit(&self) -> bool {
        !self.imp.is_open() || self.imp.is_key_down(Key::Escape)
    }
}
