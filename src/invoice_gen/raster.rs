use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgb, RgbImage};

use super::ExportError;
use super::layout::{Align, DocumentLayout, Line};

/// Every pixel dimension is multiplied by this factor so text edges stay sharp
/// after the PDF scales the bitmap back down to page width.
pub const OVERSAMPLE: u32 = 2;

/// Base glyph size of the 8x8 bitmap font, in logical pixels.
const GLYPH: u32 = 8;
/// Logical pixels of writable width between the margins.
const CONTENT_WIDTH: u32 = 640;
/// Logical pixels of margin on every edge.
const MARGIN: u32 = 32;
/// Vertical gap below each text line, in logical pixels.
const LEADING: u32 = 6;
const RULE_HEIGHT: u32 = 2;
const BLANK_HEIGHT: u32 = 12;

const INK: Rgb<u8> = Rgb([31, 41, 55]);
const RULE_COLOR: Rgb<u8> = Rgb([200, 200, 200]);
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Render the composed layout into a single RGB bitmap.
pub fn rasterize(layout: &DocumentLayout) -> Result<RgbImage, ExportError> {
    if layout.lines.is_empty() {
        return Err(ExportError::EmptyLayout);
    }

    let lines = flatten(layout);
    let logical_height = 2 * MARGIN + lines.iter().map(line_height).sum::<u32>();
    let width = (CONTENT_WIDTH + 2 * MARGIN) * OVERSAMPLE;
    let height = logical_height * OVERSAMPLE;

    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);
    let mut y = MARGIN;
    for line in &lines {
        match line {
            Line::Text {
                content,
                scale,
                align,
                emphasis,
            } => {
                let x = aligned_x(content, *scale, *align);
                draw_text(&mut image, x, y, content, *scale, *emphasis);
            }
            Line::Split {
                left,
                right,
                scale,
                emphasis,
            } => {
                draw_text(&mut image, MARGIN, y, left, *scale, *emphasis);
                let x = aligned_x(right, *scale, Align::Right);
                draw_text(&mut image, x, y, right, *scale, *emphasis);
            }
            Line::Rule => {
                fill_rect(
                    &mut image,
                    MARGIN,
                    y + BLANK_HEIGHT / 2,
                    CONTENT_WIDTH,
                    RULE_HEIGHT,
                    RULE_COLOR,
                );
            }
            Line::Blank => {}
        }
        y += line_height(line);
    }

    Ok(image)
}

/// Expand layout lines into physical lines: paragraph text is word-wrapped to
/// the column budget of its scale.
fn flatten(layout: &DocumentLayout) -> Vec<Line> {
    let mut out = Vec::new();
    for line in &layout.lines {
        match line {
            Line::Text {
                content,
                scale,
                align,
                emphasis,
            } => {
                for wrapped in wrap(content, columns_for(*scale)) {
                    out.push(Line::Text {
                        content: wrapped,
                        scale: *scale,
                        align: *align,
                        emphasis: *emphasis,
                    });
                }
            }
            other => out.push(other.clone()),
        }
    }
    out
}

fn columns_for(scale: u32) -> usize {
    (CONTENT_WIDTH / (GLYPH * scale.max(1))) as usize
}

fn line_height(line: &Line) -> u32 {
    match line {
        Line::Text { scale, .. } | Line::Split { scale, .. } => GLYPH * scale.max(&1) + LEADING,
        Line::Rule => BLANK_HEIGHT + RULE_HEIGHT + LEADING,
        Line::Blank => BLANK_HEIGHT,
    }
}

fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH * scale
}

fn aligned_x(text: &str, scale: u32, align: Align) -> u32 {
    let width = text_width(text, scale);
    match align {
        Align::Left => MARGIN,
        Align::Center => MARGIN + CONTENT_WIDTH.saturating_sub(width) / 2,
        Align::Right => MARGIN + CONTENT_WIDTH.saturating_sub(width),
    }
}

/// Word-wrap `text` to at most `cols` characters per line, preserving
/// embedded newlines and hard-breaking words longer than a full line.
fn wrap(text: &str, cols: usize) -> Vec<String> {
    let mut out = Vec::new();
    for raw in text.split('\n') {
        if raw.trim().is_empty() {
            out.push(String::new());
            continue;
        }
        let mut line = String::new();
        for word in raw.split_whitespace() {
            let mut word = word;
            while word.chars().count() > cols {
                if !line.is_empty() {
                    out.push(std::mem::take(&mut line));
                }
                let split_at = word
                    .char_indices()
                    .nth(cols)
                    .map(|(i, _)| i)
                    .unwrap_or(word.len());
                out.push(word[..split_at].to_string());
                word = &word[split_at..];
            }
            if word.is_empty() {
                continue;
            }
            if line.is_empty() {
                line.push_str(word);
            } else if line.chars().count() + 1 + word.chars().count() <= cols {
                line.push(' ');
                line.push_str(word);
            } else {
                out.push(std::mem::take(&mut line));
                line.push_str(word);
            }
        }
        out.push(line);
    }
    out
}

fn draw_text(image: &mut RgbImage, x: u32, y: u32, text: &str, scale: u32, emphasis: bool) {
    let scale = scale.max(1);
    draw_text_pass(image, x * OVERSAMPLE, y * OVERSAMPLE, text, scale);
    if emphasis {
        // Double-strike one logical pixel to the right to fake a bold weight.
        draw_text_pass(image, x * OVERSAMPLE + OVERSAMPLE, y * OVERSAMPLE, text, scale);
    }
}

fn draw_text_pass(image: &mut RgbImage, x: u32, y: u32, text: &str, scale: u32) {
    let cell = GLYPH * scale * OVERSAMPLE;
    let dot = scale * OVERSAMPLE;
    for (index, ch) in text.chars().enumerate() {
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);
        let origin_x = x + index as u32 * cell;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8u32 {
                if bits & (1 << col) != 0 {
                    fill_rect_px(
                        image,
                        origin_x + col * dot,
                        y + row as u32 * dot,
                        dot,
                        dot,
                        INK,
                    );
                }
            }
        }
    }
}

fn fill_rect(image: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    fill_rect_px(
        image,
        x * OVERSAMPLE,
        y * OVERSAMPLE,
        width * OVERSAMPLE,
        height * OVERSAMPLE,
        color,
    );
}

fn fill_rect_px(image: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let x_end = (x + width).min(image.width());
    let y_end = (y + height).min(image.height());
    for py in y.min(y_end)..y_end {
        for px in x.min(x_end)..x_end {
            image.put_pixel(px, py, color);
        }
    }
}
