//! Frame to ASCII conversion
//!
//! Images are scaled to fit the viewport while keeping their aspect ratio,
//! corrected for character cells being roughly twice as tall as wide, and
//! each cell's luminance is mapped onto a dark-to-light character ramp.

use crate::frames::FrameHandle;
use crate::screen::Viewport;
use image::imageops::FilterType;
use std::path::Path;

/// Default luminance ramp, darkest first
pub const DEFAULT_CHARSET: &str = " .:-=+*#%@";

/// Width/height ratio of a terminal character cell
pub const DEFAULT_CHAR_ASPECT: f32 = 0.5;

/// Narrowest viewport that gets a real picture
pub const MIN_RENDER_COLS: u16 = 8;

/// Text shown instead of a frame when the viewport is too small
pub const PLACEHOLDER: &str = "[too small]";

/// Recoverable failure to render one frame
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// The image could not be opened or decoded
    #[error("failed to decode frame {path}: {source}")]
    Decode {
        /// Offending file
        path: String,
        /// Decoder error
        #[source]
        source: image::ImageError,
    },

    /// A text frame could not be read
    #[error("failed to read frame: {0}")]
    Io(#[from] std::io::Error),

    /// The frame cannot be turned into text
    #[error("unsupported frame: {0}")]
    Unsupported(String),
}

/// Converts one frame into a block of text fitting a viewport
pub trait FrameRenderer {
    /// Render `frame` for a screen area of `viewport` character cells.
    fn render(&mut self, frame: &FrameHandle, viewport: Viewport) -> Result<String, RenderError>;
}

/// Luminance-ramp ASCII renderer
#[derive(Debug, Clone)]
pub struct AsciiRenderer {
    charset: Vec<u8>,
    char_aspect: f32,
}

impl Default for AsciiRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_CHARSET, DEFAULT_CHAR_ASPECT)
    }
}

impl AsciiRenderer {
    /// Create a renderer with a dark-to-light `charset` and cell aspect
    ///
    /// Non-ASCII characters are dropped from the ramp; an empty ramp falls
    /// back to [`DEFAULT_CHARSET`].
    pub fn new(charset: &str, char_aspect: f32) -> Self {
        let mut ramp: Vec<u8> = charset.bytes().filter(u8::is_ascii).collect();
        if ramp.is_empty() {
            ramp = DEFAULT_CHARSET.as_bytes().to_vec();
        }
        let char_aspect = if char_aspect.is_finite() && char_aspect > 0.0 {
            char_aspect
        } else {
            DEFAULT_CHAR_ASPECT
        };
        AsciiRenderer {
            charset: ramp,
            char_aspect,
        }
    }

    /// Character for an 8-bit luminance value
    pub fn char_for(&self, luma: u8) -> char {
        let last = self.charset.len() - 1;
        let idx = (luma as usize * last) / 255;
        self.charset[idx.min(last)] as char
    }

    /// Convert a grayscale raster already sized to the output grid
    pub fn luma_to_ascii(&self, img: &image::GrayImage) -> String {
        let (w, h) = img.dimensions();
        let mut out = String::with_capacity((w as usize + 1) * h as usize);
        for y in 0..h {
            if y > 0 {
                out.push('\n');
            }
            for x in 0..w {
                out.push(self.char_for(img.get_pixel(x, y)[0]));
            }
        }
        out
    }

    fn render_image(&self, path: &Path, viewport: Viewport) -> Result<String, RenderError> {
        let img = image::open(path).map_err(|source| RenderError::Decode {
            path: path.display().to_string(),
            source,
        })?;

        let Some((cols, rows)) = fit_dimensions(
            img.width(),
            img.height(),
            viewport.cols as u32,
            viewport.rows as u32,
            self.char_aspect,
        ) else {
            return Ok(placeholder(viewport));
        };

        let scaled = img.resize_exact(cols, rows, FilterType::Triangle).to_luma8();
        Ok(self.luma_to_ascii(&scaled))
    }
}

impl FrameRenderer for AsciiRenderer {
    fn render(&mut self, frame: &FrameHandle, viewport: Viewport) -> Result<String, RenderError> {
        if viewport.cols < MIN_RENDER_COLS || viewport.rows == 0 {
            return Ok(placeholder(viewport));
        }

        match frame {
            FrameHandle::Text(text) => Ok(crop_text(text, viewport)),
            FrameHandle::File(path) => {
                let is_text = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.eq_ignore_ascii_case("txt"))
                    .unwrap_or(false);
                if is_text {
                    let text = std::fs::read_to_string(path)?;
                    Ok(crop_text(&text, viewport))
                } else {
                    self.render_image(path, viewport)
                }
            }
        }
    }
}

/// Largest `(cols, rows)` grid that fits the bounds and keeps the aspect
///
/// `char_aspect` is the width/height ratio of one character cell. Returns
/// `None` when the source is empty or nothing fits.
pub fn fit_dimensions(
    src_width: u32,
    src_height: u32,
    max_cols: u32,
    max_rows: u32,
    char_aspect: f32,
) -> Option<(u32, u32)> {
    if src_width == 0 || src_height == 0 || max_cols == 0 || max_rows == 0 {
        return None;
    }

    let ratio = src_height as f64 / src_width as f64 * char_aspect as f64;
    let mut cols = max_cols as f64;
    let mut rows = (cols * ratio).round();
    if rows > max_rows as f64 {
        rows = max_rows as f64;
        cols = (rows / ratio).round().min(max_cols as f64);
    }

    let (cols, rows) = (cols as u32, rows.max(1.0) as u32);
    if cols == 0 {
        None
    } else {
        Some((cols, rows))
    }
}

/// Clip a pre-rendered text frame to the viewport
fn crop_text(text: &str, viewport: Viewport) -> String {
    text.lines()
        .take(viewport.rows as usize)
        .map(|line| line.chars().take(viewport.cols as usize).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn placeholder(viewport: Viewport) -> String {
    if viewport.rows == 0 {
        return String::new();
    }
    PLACEHOLDER.chars().take(viewport.cols as usize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(cols: u16, rows: u16) -> Viewport {
        Viewport { cols, rows }
    }

    #[test]
    fn test_fit_wide_source_limited_by_width() {
        // 160x90 at 0.5 aspect -> 80 cols, 22.5 rows
        assert_eq!(fit_dimensions(160, 90, 80, 40, 0.5), Some((80, 23)));
    }

    #[test]
    fn test_fit_tall_source_limited_by_height() {
        // 100x200 at 0.5 -> rows = cols, capped at 20
        assert_eq!(fit_dimensions(100, 200, 80, 20, 0.5), Some((20, 20)));
    }

    #[test]
    fn test_fit_rejects_empty() {
        assert_eq!(fit_dimensions(0, 10, 80, 24, 0.5), None);
        assert_eq!(fit_dimensions(10, 10, 0, 24, 0.5), None);
    }

    #[test]
    fn test_char_ramp_extremes() {
        let renderer = AsciiRenderer::default();
        assert_eq!(renderer.char_for(0), ' ');
        assert_eq!(renderer.char_for(255), '@');
    }

    #[test]
    fn test_non_ascii_charset_filtered() {
        let renderer = AsciiRenderer::new("█ #", 0.5);
        assert_eq!(renderer.char_for(0), ' ');
        assert_eq!(renderer.char_for(255), '#');
    }

    #[test]
    fn test_luma_to_ascii_layout() {
        let img = image::GrayImage::from_fn(3, 2, |x, _| image::Luma([if x == 0 { 0 } else { 255 }]));
        let renderer = AsciiRenderer::default();
        assert_eq!(renderer.luma_to_ascii(&img), " @@\n @@");
    }

    #[test]
    fn test_text_frame_cropped() {
        let mut renderer = AsciiRenderer::default();
        let frame = FrameHandle::Text("0123456789AB\nline2\nline3".into());
        let out = renderer.render(&frame, viewport(10, 2)).unwrap();
        assert_eq!(out, "0123456789\nline2");
    }

    #[test]
    fn test_small_viewport_placeholder() {
        let mut renderer = AsciiRenderer::default();
        let frame = FrameHandle::Text("anything".into());
        assert_eq!(renderer.render(&frame, viewport(4, 10)).unwrap(), "[too");
        assert_eq!(renderer.render(&frame, viewport(80, 0)).unwrap(), "");
    }

    #[test]
    fn test_image_file_rendered_to_fit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame_0001.png");
        image::RgbImage::from_pixel(40, 20, image::Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();

        let mut renderer = AsciiRenderer::default();
        let out = renderer
            .render(&FrameHandle::File(path), viewport(20, 10))
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| *l == "@".repeat(20)));
    }

    #[test]
    fn test_corrupt_image_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame_0001.png");
        std::fs::write(&path, b"not a png").unwrap();

        let mut renderer = AsciiRenderer::default();
        let err = renderer
            .render(&FrameHandle::File(path), viewport(20, 10))
            .unwrap_err();
        assert!(matches!(err, RenderError::Decode { .. }));
    }
}
