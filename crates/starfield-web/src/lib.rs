//! Starfield Web - community universe in the browser
//!
//! Bevy app setup plus the community feed fetched from the REST backend.

mod app;
mod feed;

pub use feed::{parse_communities, FeedConfig, FeedError};

use wasm_bindgen::prelude::*;

/// Entry point for WASM module
#[wasm_bindgen(start)]
pub fn main() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce wgpu noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build(),
    );

    app::run();
}
