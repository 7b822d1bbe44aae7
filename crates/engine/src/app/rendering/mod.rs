mod overlay;
mod renderer;
mod surface;
mod text;

pub(crate) use overlay::{draw_overlay, OverlayData};
pub use renderer::Renderer;
pub use surface::{FrameBuffer, RectPx, Surface};
pub use text::{draw_text, text_width};
