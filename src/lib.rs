/// Tab QR - Browser extension popup that turns the active tab's URL into a QR code
/// Built with Rust + WASM + Yew

pub mod export;
pub mod render;
pub mod settings;
pub mod target;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export URL validation for JavaScript access
#[wasm_bindgen]
pub fn is_encodable_url(url: &str) -> bool {
    target::is_encodable_url(url)
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
