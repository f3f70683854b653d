// Export modules for use in tests
pub mod annotation;
pub mod cursor;
pub mod engine;
pub mod event_source;
pub mod main_app;
pub mod page_index;
pub mod panic_handler;
pub mod redaction_panel;
pub mod settings;
pub mod store;
pub mod theme;

// Re-export main app components
pub use main_app::{App, run_app_with_event_source};
