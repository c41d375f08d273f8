use serde::Serialize;
use warden_config::WardenConfig;
use warden_core::ProviderKind;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize, Default)]
struct StatusResponse {
    backend_configured: bool,
    title_id: Option<String>,
    remembered_provider: Option<ProviderKind>,
    supported_providers: Vec<ProviderKind>,
    logged_in: bool,
    player_id: Option<String>,
    note: Option<String>,
}

/// Runs without a configured backend, so it is handled before the context is built.
pub async fn handle(config: WardenConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    if !config.backend.is_configured() {
        let status = StatusResponse {
            note: Some("WARDEN_BACKEND__BASE_URL and WARDEN_BACKEND__TITLE_ID not configured".into()),
            ..StatusResponse::default()
        };
        return output(&status, flags.format);
    }

    let ctx = AppContext::init(config)?;
    let remembered = ctx.remembered_provider();
    let mut status = StatusResponse {
        backend_configured: true,
        title_id: Some(ctx.config.backend.title_id.clone()),
        remembered_provider: (!remembered.is_none()).then_some(remembered),
        supported_providers: ctx.auth.providers().kinds(),
        ..StatusResponse::default()
    };

    match ctx.ensure_session().await {
        Ok(session) => {
            status.logged_in = true;
            status.player_id = Some(session.player_id.clone());
        }
        Err(error) => status.note = Some(error.to_string()),
    }

    output(&status, flags.format)
}
