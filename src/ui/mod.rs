//! Server-rendered page shell.
//!
//! SYSTEM CONTEXT
//! ==============
//! The shell is a static brand header plus a placeholder body, rendered with
//! Leptos SSR and served at `/` and `/admin`. There is no client bundle; the
//! only runtime behavior is hiding the logo when it fails to load.

pub mod app_header;
pub mod shell;

pub use app_header::LogoState;
pub use shell::render_page;
