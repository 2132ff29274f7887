//! Utility functions for WASM setup.

/// Routes Rust panics to the browser console.
///
/// Called automatically when the WASM module initializes.
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
