/// QR rendering: module grid construction and canvas drawing
use qrcode::{Color, EcLevel, QrCode};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement};

use crate::settings::QrSettings;

/// Standard quiet-zone margin, in modules, around the symbol
pub const QUIET_ZONE: usize = 4;

/// A rendered QR module grid (true = dark module)
#[derive(Debug, Clone, PartialEq)]
pub struct QrGrid {
    pub width: usize,
    modules: Vec<bool>,
}

impl QrGrid {
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.width + x]
    }
}

/// Encode a payload at the highest error-correction level.
pub fn build_grid(payload: &str) -> Result<QrGrid, String> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H)
        .map_err(|e| format!("QR encoding failed: {}", e))?;

    let width = code.width();
    let modules = code
        .to_colors()
        .into_iter()
        .map(|color| color == Color::Dark)
        .collect();

    Ok(QrGrid { width, modules })
}

/// Draw the QR code for `payload` into `container`, replacing whatever
/// artifact was there before. Exactly one canvas remains afterwards.
pub fn draw_into(
    container: &Element,
    payload: &str,
    settings: &QrSettings,
) -> Result<(), String> {
    let grid = build_grid(payload)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| "Document not available".to_string())?;

    // Replace, never accumulate
    container.set_inner_html("");

    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|e| format!("Failed to create canvas: {:?}", e))?
        .dyn_into()
        .map_err(|_| "Created element is not a canvas".to_string())?;
    canvas.set_width(settings.size);
    canvas.set_height(settings.size);

    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(|e| format!("Failed to get 2d context: {:?}", e))?
        .ok_or_else(|| "2d context not available".to_string())?
        .dyn_into()
        .map_err(|_| "Context is not CanvasRenderingContext2d".to_string())?;

    let size = f64::from(settings.size);
    let total_modules = grid.width + 2 * QUIET_ZONE;
    let scale = size / total_modules as f64;

    ctx.set_fill_style_str(&settings.bg_color);
    ctx.fill_rect(0.0, 0.0, size, size);

    ctx.set_fill_style_str(&settings.fg_color);
    for y in 0..grid.width {
        for x in 0..grid.width {
            if grid.is_dark(x, y) {
                ctx.fill_rect(
                    (x + QUIET_ZONE) as f64 * scale,
                    (y + QUIET_ZONE) as f64 * scale,
                    scale,
                    scale,
                );
            }
        }
    }

    container
        .append_child(&canvas)
        .map_err(|e| format!("Failed to attach canvas: {:?}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_grid_square() {
        let grid = build_grid("https://example.com").unwrap();

        assert!(grid.width >= 21); // version 1 is 21x21
        assert_eq!(grid.width % 2, 1); // QR widths are odd
    }

    #[test]
    fn test_build_grid_deterministic() {
        let a = build_grid("https://openai.com").unwrap();
        let b = build_grid("https://openai.com").unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_build_grid_has_finder_pattern() {
        // The top-left finder pattern always starts with a dark module
        let grid = build_grid("https://example.com").unwrap();

        assert!(grid.is_dark(0, 0));
        assert!(grid.is_dark(6, 6));
        assert!(!grid.is_dark(1, 1));
    }

    #[test]
    fn test_build_grid_different_payloads_differ() {
        let a = build_grid("https://example.com/a").unwrap();
        let b = build_grid("https://example.com/b").unwrap();

        assert_ne!(a, b);
    }
}
