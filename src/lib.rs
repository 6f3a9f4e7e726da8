/// Feed Curator - Chrome Extension for filtering subscription feeds by category
/// Built with Rust + WASM + Yew

pub mod channel_id;
pub mod content;
pub mod filter;
pub mod model;
pub mod scanner;
pub mod scraper;
pub mod serialization;
pub mod storage;
pub mod ui;
pub mod video_filter;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the content script on the host page
#[wasm_bindgen]
pub fn start_content() {
    content::start();
}
