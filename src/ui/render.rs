use image::RgbaImage;

pub const BG_COLOR: [u8; 3] = [0, 0, 0];
pub const LABEL_OFFSET: (i32, i32) = (10, 10);
const LABEL_SCALE: u32 = 2;

/// 5x7 bitmap glyphs for ASCII 32..=127, one byte per column, LSB = top row.
static FONT_5X7: [[u8; 5]; 96] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], [0x00, 0x00, 0x5F, 0x00, 0x00], [0x00, 0x07, 0x00, 0x07, 0x00], [0x14, 0x7F, 0x14, 0x7F, 0x14],
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], [0x23, 0x13, 0x08, 0x64, 0x62], [0x36, 0x49, 0x55, 0x22, 0x50], [0x00, 0x05, 0x03, 0x00, 0x00],
    [0x00, 0x1C, 0x22, 0x41, 0x00], [0x00, 0x41, 0x22, 0x1C, 0x00], [0x14, 0x08, 0x3E, 0x08, 0x14], [0x08, 0x08, 0x3E, 0x08, 0x08],
    [0x00, 0x50, 0x30, 0x00, 0x00], [0x08, 0x08, 0x08, 0x08, 0x08], [0x00, 0x60, 0x60, 0x00, 0x00], [0x20, 0x10, 0x08, 0x04, 0x02],
    [0x3E, 0x51, 0x49, 0x45, 0x3E], [0x00, 0x42, 0x7F, 0x40, 0x00], [0x42, 0x61, 0x51, 0x49, 0x46], [0x21, 0x41, 0x45, 0x4B, 0x31],
    [0x18, 0x14, 0x12, 0x7F, 0x10], [0x27, 0x45, 0x45, 0x45, 0x39], [0x3C, 0x4A, 0x49, 0x49, 0x30], [0x01, 0x71, 0x09, 0x05, 0x03],
    [0x36, 0x49, 0x49, 0x49, 0x36], [0x06, 0x49, 0x49, 0x29, 0x1E], [0x00, 0x36, 0x36, 0x00, 0x00], [0x00, 0x56, 0x36, 0x00, 0x00],
    [0x08, 0x14, 0x22, 0x41, 0x00], [0x14, 0x14, 0x14, 0x14, 0x14], [0x00, 0x41, 0x22, 0x14, 0x08], [0x02, 0x01, 0x51, 0x09, 0x06],
    [0x3E, 0x41, 0x5D, 0x55, 0x1E], [0x7E, 0x11, 0x11, 0x11, 0x7E], [0x7F, 0x49, 0x49, 0x49, 0x36], [0x3E, 0x41, 0x41, 0x41, 0x22],
    [0x7F, 0x41, 0x41, 0x22, 0x1C], [0x7F, 0x49, 0x49, 0x49, 0x41], [0x7F, 0x09, 0x09, 0x09, 0x01], [0x3E, 0x41, 0x49, 0x49, 0x7A],
    [0x7F, 0x08, 0x08, 0x08, 0x7F], [0x00, 0x41, 0x7F, 0x41, 0x00], [0x20, 0x40, 0x41, 0x3F, 0x01], [0x7F, 0x08, 0x14, 0x22, 0x41],
    [0x7F, 0x40, 0x40, 0x40, 0x40], [0x7F, 0x02, 0x0C, 0x02, 0x7F], [0x7F, 0x04, 0x08, 0x10, 0x7F], [0x3E, 0x41, 0x41, 0x41, 0x3E],
    [0x7F, 0x09, 0x09, 0x09, 0x06], [0x3E, 0x41, 0x51, 0x21, 0x5E], [0x7F, 0x09, 0x19, 0x29, 0x46], [0x46, 0x49, 0x49, 0x49, 0x31],
    [0x01, 0x01, 0x7F, 0x01, 0x01], [0x3F, 0x40, 0x40, 0x40, 0x3F], [0x1F, 0x20, 0x40, 0x20, 0x1F], [0x3F, 0x40, 0x38, 0x40, 0x3F],
    [0x63, 0x14, 0x08, 0x14, 0x63], [0x07, 0x08, 0x70, 0x08, 0x07], [0x61, 0x51, 0x49, 0x45, 0x43], [0x00, 0x7F, 0x41, 0x41, 0x00],
    [0x02, 0x04, 0x08, 0x10, 0x20], [0x00, 0x41, 0x41, 0x7F, 0x00], [0x04, 0x02, 0x01, 0x02, 0x04], [0x40, 0x40, 0x40, 0x40, 0x40],
    [0x00, 0x01, 0x02, 0x04, 0x00], [0x20, 0x54, 0x54, 0x54, 0x78], [0x7F, 0x48, 0x44, 0x44, 0x38], [0x38, 0x44, 0x44, 0x44, 0x20],
    [0x38, 0x44, 0x44, 0x48, 0x7F], [0x38, 0x54, 0x54, 0x54, 0x18], [0x08, 0x7E, 0x09, 0x01, 0x02], [0x0C, 0x52, 0x52, 0x52, 0x3E],
    [0x7F, 0x08, 0x04, 0x04, 0x78], [0x00, 0x44, 0x7D, 0x40, 0x00], [0x20, 0x40, 0x44, 0x3D, 0x00], [0x7F, 0x10, 0x28, 0x44, 0x00],
    [0x00, 0x41, 0x7F, 0x40, 0x00], [0x7C, 0x04, 0x18, 0x04, 0x78], [0x7C, 0x08, 0x04, 0x04, 0x78], [0x38, 0x44, 0x44, 0x44, 0x38],
    [0x7C, 0x14, 0x14, 0x14, 0x08], [0x08, 0x14, 0x14, 0x18, 0x7C], [0x7C, 0x08, 0x04, 0x04, 0x08], [0x48, 0x54, 0x54, 0x54, 0x20],
    [0x04, 0x3F, 0x44, 0x40, 0x20], [0x3C, 0x40, 0x40, 0x20, 0x7C], [0x1C, 0x20, 0x40, 0x20, 0x1C], [0x3C, 0x40, 0x30, 0x40, 0x3C],
    [0x44, 0x28, 0x10, 0x28, 0x44], [0x0C, 0x50, 0x50, 0x50, 0x3C], [0x44, 0x64, 0x54, 0x4C, 0x44], [0x00, 0x08, 0x36, 0x41, 0x00],
    [0x00, 0x00, 0x7F, 0x00, 0x00], [0x00, 0x41, 0x36, 0x08, 0x00], [0x10, 0x08, 0x08, 0x10, 0x08], [0x00, 0x00, 0x00, 0x00, 0x00],
];

/// Pack RGB into softbuffer u32 format: 0x00RRGGBB.
pub fn rgb(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

fn unpack_rgb(v: u32) -> (u8, u8, u8) {
    ((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

fn blend(dst: u32, r: u8, g: u8, b: u8, a: u8) -> u32 {
    let a = a as u32;
    let (dr, dg, db) = unpack_rgb(dst);
    let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a)) / 255) as u8;
    rgb(mix(r, dr), mix(g, dg), mix(b, db))
}

/// Non-ASCII characters render as '?'.
fn draw_char(buf: &mut [u32], stride: u32, buf_h: u32, ch: char, px: i32, py: i32, scale: u32, color: (u8, u8, u8, u8)) {
    let idx = match (ch as u32).checked_sub(32) {
        Some(i) if i < 96 => i as usize,
        _ => ('?' as u32 - 32) as usize,
    };
    let glyph = &FONT_5X7[idx];
    for col in 0..5u32 {
        let bits = glyph[col as usize];
        for row in 0..7u32 {
            if bits & (1 << row) == 0 {
                continue;
            }
            for sy in 0..scale {
                for sx in 0..scale {
                    let x = px + (col * scale + sx) as i32;
                    let y = py + (row * scale + sy) as i32;
                    if x >= 0 && y >= 0 && (x as u32) < stride && (y as u32) < buf_h {
                        let off = (y as u32 * stride + x as u32) as usize;
                        buf[off] = blend(buf[off], color.0, color.1, color.2, color.3);
                    }
                }
            }
        }
    }
}

/// Draw a string. Returns the x position after the last character.
pub fn draw_text(buf: &mut [u32], stride: u32, buf_h: u32, text: &str, px: i32, py: i32, scale: u32, color: (u8, u8, u8, u8)) -> i32 {
    let mut x = px;
    for ch in text.chars() {
        draw_char(buf, stride, buf_h, ch, x, py, scale, color);
        x += (6 * scale) as i32;
    }
    x
}

pub fn fill_rect(buf: &mut [u32], stride: u32, buf_h: u32, rx: i32, ry: i32, rw: u32, rh: u32, color: (u8, u8, u8, u8)) {
    for row in 0..rh {
        let y = ry + row as i32;
        if y < 0 || y as u32 >= buf_h {
            continue;
        }
        for col in 0..rw {
            let x = rx + col as i32;
            if x < 0 || x as u32 >= stride {
                continue;
            }
            let off = (y as u32 * stride + x as u32) as usize;
            buf[off] = blend(buf[off], color.0, color.1, color.2, color.3);
        }
    }
}

/// Copy `src` into the framebuffer centered, clipping whatever falls outside.
/// Transparent pixels blend against what is already there.
pub fn blit_centered(dst: &mut [u32], dst_w: u32, dst_h: u32, src: &RgbaImage) {
    let (src_w, src_h) = src.dimensions();
    let x0 = (dst_w as i64 - src_w as i64) / 2;
    let y0 = (dst_h as i64 - src_h as i64) / 2;

    let dx_start = x0.max(0) as u32;
    let dy_start = y0.max(0) as u32;
    let dx_end = (x0 + src_w as i64).clamp(0, dst_w as i64) as u32;
    let dy_end = (y0 + src_h as i64).clamp(0, dst_h as i64) as u32;

    for dy in dy_start..dy_end {
        let sy = (dy as i64 - y0) as u32;
        for dx in dx_start..dx_end {
            let sx = (dx as i64 - x0) as u32;
            let [r, g, b, a] = src.get_pixel(sx, sy).0;
            let di = dy as usize * dst_w as usize + dx as usize;
            dst[di] = match a {
                255 => rgb(r, g, b),
                0 => dst[di],
                _ => blend(dst[di], r, g, b, a),
            };
        }
    }
}

/// Paint a whole frame: background, image, optional file name label.
///
/// Rows beyond what `buf` holds are dropped, so a framebuffer that lags a
/// window resize is never overrun.
pub fn draw_frame(buf: &mut [u32], fb_w: u32, fb_h: u32, pixels: Option<&RgbaImage>, label: Option<&str>) {
    let fb_w = fb_w.max(1);
    let fb_h = fb_h.min((buf.len() / fb_w as usize) as u32);
    buf.fill(rgb(BG_COLOR[0], BG_COLOR[1], BG_COLOR[2]));
    if let Some(img) = pixels {
        blit_centered(buf, fb_w, fb_h, img);
    }
    if let Some(text) = label {
        let (x, y) = LABEL_OFFSET;
        let text_w = text.chars().count() as u32 * 6 * LABEL_SCALE;
        fill_rect(buf, fb_w, fb_h, x - 4, y - 4, text_w + 8, 7 * LABEL_SCALE + 8, (0, 0, 0, 255));
        draw_text(buf, fb_w, fb_h, text, x, y, LABEL_SCALE, (255, 255, 255, 255));
    }
}
