use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture, TextureError};
use winit::window::Window;

use super::surface::FrameBuffer;

/// Fixed-resolution frame buffer presented to a window through `pixels`.
///
/// The logical resolution never changes after creation; only the window surface the
/// buffer is scaled onto can be resized.
pub struct Renderer {
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>, width: u32, height: u32) -> Result<Self, Error> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, window);
        let pixels = Pixels::new(width, height, surface)?;
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn frame(&mut self) -> FrameBuffer<'_> {
        FrameBuffer::new(self.pixels.frame_mut(), self.width, self.height)
    }

    pub fn present(&self) -> Result<(), Error> {
        self.pixels.render()
    }

    pub fn resize_surface(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)
    }
}
