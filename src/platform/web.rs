//! JS-facing bridge
//!
//! The page owns rendering and timers; it hands events over as JSON and
//! reads back JSON snapshots.

use wasm_bindgen::prelude::*;

use crate::app::{App, UiEvent};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Memory Maestro starting...");
}

/// Game instance held by the page
#[wasm_bindgen]
pub struct WebApp {
    app: App,
    /// Sub-millisecond remainder carried between frames
    carry_ms: f64,
}

#[wasm_bindgen]
impl WebApp {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebApp {
        WebApp {
            app: App::with_default_store(),
            carry_ms: 0.0,
        }
    }

    /// Apply a JSON-encoded `UiEvent`; returns the validation message, if any
    pub fn handle(&mut self, event_json: &str) -> Result<Option<String>, JsError> {
        let event: UiEvent = serde_json::from_str(event_json)?;
        Ok(self.app.handle(event).err().map(|e| e.to_string()))
    }

    /// Advance time; call from a `setInterval`/`requestAnimationFrame` loop
    pub fn update(&mut self, dt_ms: f64) {
        let total = self.carry_ms + dt_ms.max(0.0);
        let whole = total.floor();
        self.carry_ms = total - whole;
        self.app.update(whole as u64);
    }

    /// Current state as JSON
    pub fn snapshot(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.app.snapshot())?)
    }
}

impl Default for WebApp {
    fn default() -> Self {
        Self::new()
    }
}
