//! cMatch snip: region capture and visual product search.
//!
//! Wires the domains together. No business logic lives here, only module
//! declarations and process setup.
//!
//!   - capture:  viewport raster, drag selection, crop + JPEG encode
//!   - search:   upload a crop to the visual search API
//!   - settings: layered configuration
//!   - snip:     one snip end to end, driven by a host's pointer events

pub mod capture;
pub mod search;
pub mod settings;
pub mod snip;

pub use capture::{CaptureSource, ViewportRaster};
pub use settings::SnipSettings;
pub use snip::{SnipController, SnipError};

/// Process setup: load env files from the working directory, then start
/// logging. Hosts that keep their env files elsewhere call `init_in`.
///
/// Host entry points after setup: `SnipSettings::load` for configuration,
/// `SnipController::from_settings` for the snip itself and
/// `VisualSearchClient::from_settings` for the upload.
pub fn init() {
    let root = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
    init_in(&root);
}

/// Same as `init`, reading the first of `.env.local` or `.env` found in
/// `project_root`.
///
/// Safe to call more than once; only the first call installs the logger.
/// Variables already set in the process environment win over the file.
pub fn init_in(project_root: &std::path::Path) {
    'env_load: for env_file in [".env.local", ".env"] {
        let path = project_root.join(env_file);
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            break 'env_load;
        }
    }

    let logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
    if logger.is_ok() {
        log::info!("cMatch snip {} ready", env!("CARGO_PKG_VERSION"));
    }
}
