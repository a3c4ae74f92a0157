//! Page shell routes.

use axum::extract::State;
use axum::response::Html;

use crate::state::AppState;
use crate::ui::{LogoState, render_page};

/// `GET /` and `GET /admin`: the server-rendered shell.
///
/// The logo is rendered hidden when the asset is missing from `ASSETS_DIR`.
pub async fn shell(State(state): State<AppState>) -> Html<String> {
    let logo = LogoState::from_asset(&state.settings.assets_dir);
    Html(render_page(logo))
}
