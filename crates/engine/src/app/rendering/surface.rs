use image::RgbaImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectPx {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl RectPx {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Draw target for one frame. Coordinates are pixels with the origin at the top-left.
pub trait Surface {
    fn size(&self) -> (u32, u32);
    fn clear(&mut self, color: [u8; 4]);
    /// Paints `image` with its top-left corner at `(x, y)`, blending by the image's alpha.
    fn blit(&mut self, image: &RgbaImage, x: i32, y: i32);
    fn fill_rect(&mut self, rect: RectPx, color: [u8; 4]);
}

/// `Surface` over a raw RGBA8 frame, row-major, no padding.
pub struct FrameBuffer<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> FrameBuffer<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        debug_assert_eq!(frame.len(), width as usize * height as usize * 4);
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.frame.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

impl Surface for FrameBuffer<'_> {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: [u8; 4]) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    fn blit(&mut self, image: &RgbaImage, x: i32, y: i32) {
        let (src_w, src_h) = image.dimensions();
        let Some(clip) = clip_rect(
            RectPx::new(x, y, src_w as i32, src_h as i32),
            self.width,
            self.height,
        ) else {
            return;
        };

        let src = image.as_raw();
        let dst_stride = self.width as usize * 4;
        let src_stride = src_w as usize * 4;
        let row_bytes = clip.width as usize * 4;
        for row in 0..clip.height {
            let dst_y = (clip.y + row) as usize;
            let src_y = (clip.y + row - y) as usize;
            let src_x = (clip.x - x) as usize;
            let dst_start = dst_y * dst_stride + clip.x as usize * 4;
            let src_start = src_y * src_stride + src_x * 4;
            let dst_row = &mut self.frame[dst_start..dst_start + row_bytes];
            let src_row = &src[src_start..src_start + row_bytes];
            for (dst_px, src_px) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                blend_over(dst_px, [src_px[0], src_px[1], src_px[2], src_px[3]]);
            }
        }
    }

    fn fill_rect(&mut self, rect: RectPx, color: [u8; 4]) {
        let Some(clip) = clip_rect(rect, self.width, self.height) else {
            return;
        };
        let stride = self.width as usize * 4;
        for py in clip.y..clip.y + clip.height {
            let start = py as usize * stride + clip.x as usize * 4;
            let end = start + clip.width as usize * 4;
            for dst_px in self.frame[start..end].chunks_exact_mut(4) {
                blend_over(dst_px, color);
            }
        }
    }
}

fn clip_rect(rect: RectPx, width: u32, height: u32) -> Option<RectPx> {
    let left = rect.x.max(0);
    let top = rect.y.max(0);
    let right = rect.x.saturating_add(rect.width).min(width as i32);
    let bottom = rect.y.saturating_add(rect.height).min(height as i32);
    if left >= right || top >= bottom {
        return None;
    }
    Some(RectPx::new(left, top, right - left, bottom - top))
}

fn blend_over(dst: &mut [u8], src: [u8; 4]) {
    match src[3] {
        0 => {}
        255 => dst.copy_from_slice(&src),
        alpha => {
            let a = alpha as u32;
            let inv = 255 - a;
            for channel in 0..3 {
                let blended = (src[channel] as u32 * a + dst[channel] as u32 * inv + 127) / 255;
                dst[channel] = blended as u8;
            }
            dst[3] = (a + (dst[3] as u32 * inv + 127) / 255).min(255) as u8;
        }
    }
}
