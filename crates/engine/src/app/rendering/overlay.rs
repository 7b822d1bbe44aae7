use crate::app::{LoopMetricsSnapshot, LoopPhase};

use super::surface::{RectPx, Surface};
use super::text::{draw_text, line_height, text_width};

const TEXT_SCALE: i32 = 2;
const OVERLAY_PADDING: i32 = 6 * TEXT_SCALE;
const OVERLAY_PANEL_INSET_X: i32 = 4 * TEXT_SCALE;
const OVERLAY_PANEL_INSET_Y: i32 = 3 * TEXT_SCALE;
const OVERLAY_TEXT_COLOR: [u8; 4] = [244, 248, 252, 255];
const OVERLAY_PANEL_BG_COLOR: [u8; 4] = [10, 12, 16, 210];
const OVERLAY_PANEL_BORDER_COLOR: [u8; 4] = [92, 106, 126, 255];

#[derive(Debug, Clone)]
pub(crate) struct OverlayData {
    pub metrics: LoopMetricsSnapshot,
    pub target_fps: u32,
    pub phase: LoopPhase,
    pub background_set: Option<String>,
}

/// Debug panel anchored to the bottom-left so it never covers the health bars.
pub(crate) fn draw_overlay(surface: &mut dyn Surface, data: &OverlayData) {
    let (width, height) = surface.size();
    if width == 0 || height == 0 {
        return;
    }

    let lines = build_overlay_lines(data);
    let longest = lines
        .iter()
        .map(|line| text_width(line, TEXT_SCALE))
        .max()
        .unwrap_or(0);
    let panel = RectPx::new(
        OVERLAY_PADDING - OVERLAY_PANEL_INSET_X,
        height as i32
            - OVERLAY_PADDING
            - lines.len() as i32 * line_height(TEXT_SCALE)
            - OVERLAY_PANEL_INSET_Y,
        longest + OVERLAY_PANEL_INSET_X * 2,
        lines.len() as i32 * line_height(TEXT_SCALE) + OVERLAY_PANEL_INSET_Y * 2,
    );
    surface.fill_rect(panel, OVERLAY_PANEL_BG_COLOR);
    draw_outline(surface, panel, OVERLAY_PANEL_BORDER_COLOR);

    let mut y = panel.y + OVERLAY_PANEL_INSET_Y;
    for line in &lines {
        draw_text(surface, OVERLAY_PADDING, y, line, OVERLAY_TEXT_COLOR, TEXT_SCALE);
        y += line_height(TEXT_SCALE);
    }
}

fn build_overlay_lines(data: &OverlayData) -> Vec<String> {
    vec![
        format!("FPS: {:.1} / {}", data.metrics.fps, data.target_fps),
        format!("Frame: {:.2} ms", data.metrics.frame_time_ms),
        format!("Phase: {}", phase_label(data.phase)),
        format!(
            "Stage: {}",
            data.background_set.as_deref().unwrap_or("none")
        ),
    ]
}

fn phase_label(phase: LoopPhase) -> &'static str {
    match phase {
        LoopPhase::Init(_) => "init",
        LoopPhase::Running => "running",
        LoopPhase::Terminated => "terminated",
    }
}

fn draw_outline(surface: &mut dyn Surface, rect: RectPx, color: [u8; 4]) {
    if rect.width <= 1 || rect.height <= 1 {
        return;
    }
    surface.fill_rect(RectPx::new(rect.x, rect.y, rect.width, 1), color);
    surface.fill_rect(
        RectPx::new(rect.x, rect.y + rect.height - 1, rect.width, 1),
        color,
    );
    surface.fill_rect(RectPx::new(rect.x, rect.y, 1, rect.height), color);
    surface.fill_rect(
        RectPx::new(rect.x + rect.width - 1, rect.y, 1, rect.height),
        color,
    );
}

#[cfg(test)]
mod tests {
    use super::super::surface::FrameBuffer;
    use super::*;

    fn sample_data() -> OverlayData {
        OverlayData {
            metrics: LoopMetricsSnapshot {
                fps: 59.94,
                frame_time_ms: 16.68,
            },
            target_fps: 60,
            phase: LoopPhase::Running,
            background_set: Some("dojo".to_string()),
        }
    }

    #[test]
    fn lines_report_metrics_phase_and_stage() {
        let lines = build_overlay_lines(&sample_data());
        assert_eq!(
            lines,
            vec![
                "FPS: 59.9 / 60".to_string(),
                "Frame: 16.68 ms".to_string(),
                "Phase: running".to_string(),
                "Stage: dojo".to_string(),
            ]
        );
    }

    #[test]
    fn overlay_writes_border_pixels() {
        let mut bytes = vec![0u8; 320 * 180 * 4];
        let mut frame = FrameBuffer::new(&mut bytes, 320, 180);
        draw_overlay(&mut frame, &sample_data());

        let has_border_pixel = bytes
            .chunks_exact(4)
            .any(|px| px == OVERLAY_PANEL_BORDER_COLOR);
        assert!(has_border_pixel);
    }

    #[test]
    fn tiny_frames_never_panic() {
        let mut bytes = vec![0u8; 4];
        let mut frame = FrameBuffer::new(&mut bytes, 1, 1);
        draw_overlay(&mut frame, &sample_data());

        let mut empty: Vec<u8> = Vec::new();
        let mut frame = FrameBuffer::new(&mut empty, 0, 0);
        draw_overlay(&mut frame, &sample_data());
    }
}
