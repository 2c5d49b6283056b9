use std::sync::Arc;

use coverdiff_core::{PdfBackend, TextService};

/// Shared application state accessible from all handlers.
///
/// Both handles are read-only; every request owns its buffers and results.
pub struct AppState {
    pub backend: Arc<dyn PdfBackend>,
    pub service: Arc<dyn TextService>,
}
