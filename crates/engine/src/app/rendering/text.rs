use super::surface::{RectPx, Surface};

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: usize = 5;
const FIRST_GLYPH: char = ' ';
const LAST_GLYPH: char = '~';

/// 3x5 bitmap rows for printable ASCII, indexed from `' '`. Bit 2 is the leftmost column.
const GLYPHS: [[u8; GLYPH_HEIGHT]; 95] = [
    [0b000, 0b000, 0b000, 0b000, 0b000],    // space
    [0b010, 0b010, 0b010, 0b000, 0b010],    // !
    [0b101, 0b101, 0b000, 0b000, 0b000],    // "
    [0b101, 0b111, 0b101, 0b111, 0b101],    // #
    [0b111, 0b110, 0b111, 0b011, 0b111],    // $
    [0b101, 0b001, 0b010, 0b100, 0b101],    // %
    [0b010, 0b101, 0b010, 0b101, 0b011],    // &
    [0b010, 0b010, 0b000, 0b000, 0b000],    // '
    [0b001, 0b010, 0b010, 0b010, 0b001],    // (
    [0b100, 0b010, 0b010, 0b010, 0b100],    // )
    [0b000, 0b101, 0b010, 0b101, 0b000],    // *
    [0b000, 0b010, 0b111, 0b010, 0b000],    // +
    [0b000, 0b000, 0b000, 0b010, 0b100],    // ,
    [0b000, 0b000, 0b111, 0b000, 0b000],    // -
    [0b000, 0b000, 0b000, 0b000, 0b010],    // .
    [0b001, 0b001, 0b010, 0b100, 0b100],    // /
    [0b111, 0b101, 0b101, 0b101, 0b111],    // 0
    [0b010, 0b110, 0b010, 0b010, 0b111],    // 1
    [0b111, 0b001, 0b111, 0b100, 0b111],    // 2
    [0b111, 0b001, 0b111, 0b001, 0b111],    // 3
    [0b101, 0b101, 0b111, 0b001, 0b001],    // 4
    [0b111, 0b100, 0b111, 0b001, 0b111],    // 5
    [0b111, 0b100, 0b111, 0b101, 0b111],    // 6
    [0b111, 0b001, 0b010, 0b010, 0b010],    // 7
    [0b111, 0b101, 0b111, 0b101, 0b111],    // 8
    [0b111, 0b101, 0b111, 0b001, 0b111],    // 9
    [0b000, 0b010, 0b000, 0b010, 0b000],    // :
    [0b000, 0b010, 0b000, 0b010, 0b100],    // ;
    [0b001, 0b010, 0b100, 0b010, 0b001],    // <
    [0b000, 0b111, 0b000, 0b111, 0b000],    // =
    [0b100, 0b010, 0b001, 0b010, 0b100],    // >
    [0b111, 0b001, 0b011, 0b000, 0b010],    // ?
    [0b111, 0b101, 0b111, 0b100, 0b111],    // @
    [0b010, 0b101, 0b111, 0b101, 0b101],    // A
    [0b110, 0b101, 0b110, 0b101, 0b110],    // B
    [0b111, 0b100, 0b100, 0b100, 0b111],    // C
    [0b110, 0b101, 0b101, 0b101, 0b110],    // D
    [0b111, 0b100, 0b110, 0b100, 0b111],    // E
    [0b111, 0b100, 0b110, 0b100, 0b100],    // F
    [0b111, 0b100, 0b101, 0b101, 0b111],    // G
    [0b101, 0b101, 0b111, 0b101, 0b101],    // H
    [0b111, 0b010, 0b010, 0b010, 0b111],    // I
    [0b111, 0b001, 0b001, 0b101, 0b111],    // J
    [0b101, 0b101, 0b110, 0b101, 0b101],    // K
    [0b100, 0b100, 0b100, 0b100, 0b111],    // L
    [0b101, 0b111, 0b111, 0b101, 0b101],    // M
    [0b101, 0b111, 0b111, 0b111, 0b101],    // N
    [0b111, 0b101, 0b101, 0b101, 0b111],    // O
    [0b110, 0b101, 0b110, 0b100, 0b100],    // P
    [0b111, 0b101, 0b101, 0b111, 0b001],    // Q
    [0b110, 0b101, 0b110, 0b101, 0b101],    // R
    [0b111, 0b100, 0b111, 0b001, 0b111],    // S
    [0b111, 0b010, 0b010, 0b010, 0b010],    // T
    [0b101, 0b101, 0b101, 0b101, 0b111],    // U
    [0b101, 0b101, 0b101, 0b101, 0b010],    // V
    [0b101, 0b101, 0b111, 0b111, 0b101],    // W
    [0b101, 0b101, 0b010, 0b101, 0b101],    // X
    [0b101, 0b101, 0b010, 0b010, 0b010],    // Y
    [0b111, 0b001, 0b010, 0b100, 0b111],    // Z
    [0b110, 0b100, 0b100, 0b100, 0b110],    // [
    [0b100, 0b100, 0b010, 0b001, 0b001],    // \
    [0b011, 0b001, 0b001, 0b001, 0b011],    // ]
    [0b010, 0b101, 0b000, 0b000, 0b000],    // ^
    [0b000, 0b000, 0b000, 0b000, 0b111],    // _
    [0b100, 0b010, 0b000, 0b000, 0b000],    // `
    [0b000, 0b111, 0b001, 0b111, 0b111],    // a
    [0b100, 0b100, 0b110, 0b101, 0b110],    // b
    [0b000, 0b111, 0b100, 0b100, 0b111],    // c
    [0b001, 0b001, 0b111, 0b101, 0b111],    // d
    [0b000, 0b111, 0b110, 0b100, 0b111],    // e
    [0b011, 0b100, 0b110, 0b100, 0b100],    // f
    [0b000, 0b111, 0b101, 0b111, 0b001],    // g
    [0b100, 0b100, 0b110, 0b101, 0b101],    // h
    [0b010, 0b000, 0b010, 0b010, 0b010],    // i
    [0b001, 0b000, 0b001, 0b101, 0b010],    // j
    [0b100, 0b101, 0b110, 0b101, 0b101],    // k
    [0b100, 0b100, 0b100, 0b100, 0b111],    // l
    [0b000, 0b110, 0b111, 0b101, 0b101],    // m
    [0b000, 0b110, 0b101, 0b101, 0b101],    // n
    [0b000, 0b111, 0b101, 0b101, 0b111],    // o
    [0b000, 0b110, 0b101, 0b110, 0b100],    // p
    [0b000, 0b111, 0b101, 0b111, 0b001],    // q
    [0b000, 0b110, 0b101, 0b100, 0b100],    // r
    [0b000, 0b111, 0b110, 0b001, 0b111],    // s
    [0b010, 0b111, 0b010, 0b010, 0b011],    // t
    [0b000, 0b101, 0b101, 0b101, 0b111],    // u
    [0b000, 0b101, 0b101, 0b101, 0b010],    // v
    [0b000, 0b101, 0b101, 0b111, 0b010],    // w
    [0b000, 0b101, 0b010, 0b010, 0b101],    // x
    [0b000, 0b101, 0b101, 0b111, 0b001],    // y
    [0b000, 0b111, 0b001, 0b010, 0b111],    // z
    [0b011, 0b010, 0b110, 0b010, 0b011],    // {
    [0b010, 0b010, 0b010, 0b010, 0b010],    // |
    [0b110, 0b010, 0b011, 0b010, 0b110],    // }
    [0b000, 0b011, 0b110, 0b000, 0b000],    // ~
];

/// Horizontal advance of one character at `scale`.
pub fn glyph_advance(scale: i32) -> i32 {
    (GLYPH_WIDTH + 1) * scale
}

pub fn line_height(scale: i32) -> i32 {
    (GLYPH_HEIGHT as i32 + 2) * scale
}

pub fn text_width(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * glyph_advance(scale)
}

/// Draws `text` with its top-left at `(x, y)`. Characters outside printable ASCII draw as blanks.
pub fn draw_text(
    surface: &mut dyn Surface,
    x: i32,
    y: i32,
    text: &str,
    color: [u8; 4],
    scale: i32,
) {
    let scale = scale.max(1);
    let mut pen_x = x;
    for ch in text.chars() {
        if let Some(rows) = glyph_rows(ch) {
            draw_glyph(surface, pen_x, y, rows, color, scale);
        }
        pen_x += glyph_advance(scale);
    }
}

fn glyph_rows(ch: char) -> Option<&'static [u8; GLYPH_HEIGHT]> {
    if !(FIRST_GLYPH..=LAST_GLYPH).contains(&ch) {
        return None;
    }
    GLYPHS.get(ch as usize - FIRST_GLYPH as usize)
}

fn draw_glyph(
    surface: &mut dyn Surface,
    x: i32,
    y: i32,
    rows: &[u8; GLYPH_HEIGHT],
    color: [u8; 4],
    scale: i32,
) {
    for (row_index, row_bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if row_bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            surface.fill_rect(
                RectPx::new(
                    x + col * scale,
                    y + row_index as i32 * scale,
                    scale,
                    scale,
                ),
                color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::surface::FrameBuffer;
    use super::*;

    #[test]
    fn every_printable_ascii_char_has_a_glyph() {
        for code in 32u8..=126u8 {
            let ch = char::from(code);
            assert!(glyph_rows(ch).is_some(), "missing glyph for '{ch}'");
        }
        assert!(glyph_rows('\u{7f}').is_none());
        assert!(glyph_rows('é').is_none());
    }

    #[test]
    fn space_draws_nothing_and_letters_draw_pixels() {
        let mut bytes = vec![0u8; 16 * 8 * 4];
        let mut frame = FrameBuffer::new(&mut bytes, 16, 8);
        draw_text(&mut frame, 0, 0, " ", [255, 255, 255, 255], 1);
        assert!(bytes.iter().all(|byte| *byte == 0));

        let mut frame = FrameBuffer::new(&mut bytes, 16, 8);
        draw_text(&mut frame, 0, 0, "H", [255, 255, 255, 255], 1);
        assert_eq!(frame.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(frame.pixel(1, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn text_clipped_at_frame_edges_is_safe() {
        let mut bytes = vec![0u8; 8 * 8 * 4];
        let mut frame = FrameBuffer::new(&mut bytes, 8, 8);
        draw_text(&mut frame, -4, -4, "FIGHT", [255, 0, 0, 255], 3);
        draw_text(&mut frame, 64, 64, "KO", [255, 0, 0, 255], 3);
    }

    #[test]
    fn width_follows_scale() {
        assert_eq!(text_width("WINS", 1), 16);
        assert_eq!(text_width("WINS", 3), 48);
        assert_eq!(line_height(3), 21);
    }
}
