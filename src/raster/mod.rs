//! Software raster canvas
//!
//! Just enough of a 2D canvas to draw the export summary card: solid
//! rectangles, bitmap text, and PNG / data URI output. Pixels drawn outside
//! the canvas are clipped.

pub mod font;
pub mod png;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);
}

/// RGB pixel buffer
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    /// New canvas, initially black like a fresh `<canvas>` with alpha dropped
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some(Rgb(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    fn put(&mut self, x: i32, y: i32, color: Rgb) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let i = self.offset(x as u32, y as u32);
        self.pixels[i] = color.0;
        self.pixels[i + 1] = color.1;
        self.pixels[i + 2] = color.2;
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgb) {
        for py in y..y.saturating_add(h as i32) {
            for px in x..x.saturating_add(w as i32) {
                self.put(px, py, color);
            }
        }
    }

    /// Fill the whole canvas
    pub fn clear(&mut self, color: Rgb) {
        self.fill_rect(0, 0, self.width, self.height, color);
    }

    /// Draw text with its baseline at `baseline`, each font pixel `scale` px square
    pub fn fill_text(&mut self, text: &str, x: i32, baseline: i32, scale: u32, color: Rgb) {
        let advance = (font::GLYPH_WIDTH * scale + 1) as i32;
        let top = baseline - (font::GLYPH_HEIGHT * scale) as i32;

        for (i, c) in text.chars().enumerate() {
            let gx = x + i as i32 * advance;
            if gx >= self.width as i32 {
                break;
            }
            let rows = font::glyph(c);
            for row in 0..font::GLYPH_HEIGHT {
                for col in 0..font::GLYPH_WIDTH {
                    if font::is_set(rows, col, row) {
                        self.fill_rect(
                            gx + (col * scale) as i32,
                            top + (row * scale) as i32,
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
        }
    }

    pub fn to_png(&self) -> std::io::Result<Vec<u8>> {
        png::encode_rgb(self.width, self.height, &self.pixels)
    }

    /// `data:image/png;base64,...`, the form `HTMLCanvasElement.toDataURL()` returns
    pub fn to_data_url(&self) -> std::io::Result<String> {
        let png = self.to_png()?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }
}
