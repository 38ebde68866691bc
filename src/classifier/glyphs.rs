//! Canonical digit templates.
//!
//! Each digit is a 5x7 glyph rasterized onto the target pixel format: the
//! glyph spans the full height and keeps its 5:7 aspect ratio, centered
//! horizontally. On the 28x28 format every glyph cell is exactly 4x4 pixels.

use crate::classification::Digit;
use crate::pixels::{PixelBuffer, PixelFormat};

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

const GLYPHS: [[&str; 7]; 10] = [
    [" ### ", "#   #", "#  ##", "# # #", "##  #", "#   #", " ### "],
    ["  #  ", " ##  ", "  #  ", "  #  ", "  #  ", "  #  ", " ### "],
    [" ### ", "#   #", "    #", "   # ", "  #  ", " #   ", "#####"],
    ["#####", "   # ", "  #  ", "   # ", "    #", "#   #", " ### "],
    ["   # ", "  ## ", " # # ", "#  # ", "#####", "   # ", "   # "],
    ["#####", "#    ", "#### ", "    #", "    #", "#   #", " ### "],
    ["  ## ", " #   ", "#    ", "#### ", "#   #", "#   #", " ### "],
    ["#####", "    #", "   # ", "  #  ", " #   ", " #   ", " #   "],
    [" ### ", "#   #", "#   #", " ### ", "#   #", "#   #", " ### "],
    [" ### ", "#   #", "#   #", " ####", "    #", "   # ", " ##  "],
];

fn glyph_cell(digit: Digit, col: u32, row: u32) -> bool {
    GLYPHS[digit.index()][row as usize].as_bytes()[col as usize] == b'#'
}

/// `value * num / den` with the product taken in u64
fn scale(value: u32, num: u32, den: u32) -> u32 {
    (u64::from(value) * u64::from(num) / u64::from(den)) as u32
}

/// Render the canonical template for `digit` in `format`
pub fn template(digit: Digit, format: &PixelFormat) -> PixelBuffer {
    let (width, height) = (format.width, format.height);
    if format.is_empty() {
        return PixelBuffer::new_unchecked(*format, Vec::new());
    }
    let box_width = scale(height, GLYPH_WIDTH, GLYPH_HEIGHT).clamp(1, width);
    let offset_x = (width - box_width) / 2;

    let mut samples = Vec::with_capacity(format.len());
    for y in 0..height {
        let row = scale(y, GLYPH_HEIGHT, height);
        for x in 0..width {
            let ink = x >= offset_x
                && x < offset_x + box_width
                && glyph_cell(digit, scale(x - offset_x, GLYPH_WIDTH, box_width), row);
            samples.push(if ink { format.max_value } else { format.min_value });
        }
    }

    PixelBuffer::new_unchecked(*format, samples)
}

/// Templates for all ten digits, in digit order
pub fn all_templates(format: &PixelFormat) -> Vec<(Digit, PixelBuffer)> {
    Digit::ALL
        .iter()
        .map(|&digit| (digit, template(digit, format)))
        .collect()
}
