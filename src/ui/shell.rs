//! Full HTML document for the page shell.

use leptos::prelude::*;

use super::app_header::{AppHeader, LogoState};

pub const PLACEHOLDER: &str = "Stage 1 skeleton — upload interface coming in Stage 8.";

const STYLES: &str = "\
body { margin: 0; background: #0A0D12; color: #F9FAFB; font-family: 'IBM Plex Sans', sans-serif; }
.app-header { display: flex; align-items: center; gap: 16px; padding: 12px 24px; background: #1F2937; }
.app-header__logo { height: 32px; }
.app-header__title { margin: 0; font-size: 20px; }
.app-header__nav { margin-left: auto; display: flex; gap: 16px; }
.app-header__nav a { color: #F9FAFB; text-decoration: none; }
.app-main { padding: 24px; }
";

// Hides any image marked `data-fallback=\"hide\"` once it errors, including
// errors that fired before this script ran.
const LOGO_FALLBACK_SCRIPT: &str = "\
document.querySelectorAll('img[data-fallback=hide]').forEach(function (img) {
  var hide = function () { img.style.display = 'none'; };
  img.addEventListener('error', hide);
  if (img.complete) { if (img.naturalWidth === 0) { hide(); } }
});
";

#[component]
fn Shell(logo: LogoState) -> impl IntoView {
    view! {
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <title>"VME Analyzer"</title>
                <style inner_html=STYLES></style>
            </head>
            <body>
                <AppHeader logo=logo />
                <main class="app-main">
                    <p>{PLACEHOLDER}</p>
                </main>
                <script inner_html=LOGO_FALLBACK_SCRIPT></script>
            </body>
        </html>
    }
}

/// Render the shell to a complete HTML document.
#[must_use]
pub fn render_page(logo: LogoState) -> String {
    let owner = Owner::new();
    let html = owner.with(|| view! { <Shell logo=logo /> }.to_html());
    format!("<!DOCTYPE html>{html}")
}

#[cfg(test)]
#[path = "shell_test.rs"]
mod tests;
