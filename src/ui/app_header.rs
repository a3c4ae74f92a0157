//! Brand header: logo, title and the two navigation links.

use std::path::Path;

use leptos::prelude::*;

pub const LOGO_FILE: &str = "uss-logo.png";
pub const LOGO_SRC: &str = "/assets/uss-logo.png";
pub const LOGO_ALT: &str = "US Signal";

/// Whether the brand image is shown. A hidden logo stays in the markup with
/// `display: none`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogoState {
    #[default]
    Visible,
    Hidden,
}

impl LogoState {
    /// `Hidden` when `LOGO_FILE` is not present in `assets_dir`.
    #[must_use]
    pub fn from_asset(assets_dir: &Path) -> Self {
        if assets_dir.join(LOGO_FILE).is_file() { Self::Visible } else { Self::Hidden }
    }

    /// Image failed to load. Idempotent.
    pub fn hide_on_error(&mut self) {
        *self = Self::Hidden;
    }

    #[must_use]
    pub fn is_hidden(self) -> bool {
        self == Self::Hidden
    }

    fn style(self) -> &'static str {
        if self.is_hidden() { "display: none" } else { "" }
    }
}

#[component]
pub fn AppHeader(logo: LogoState) -> impl IntoView {
    view! {
        <header class="app-header">
            <img
                class="app-header__logo"
                src=LOGO_SRC
                alt=LOGO_ALT
                style=logo.style()
                data-fallback="hide"
            />
            <h1 class="app-header__title">"VME Analyzer"</h1>
            <nav class="app-header__nav">
                <a href="/">"Analyze"</a>
                <a href="/admin">"Admin"</a>
            </nav>
        </header>
    }
}
