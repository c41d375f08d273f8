use serde::Serialize;
use warden_core::ProviderKind;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct LogoutResponse {
    logged_out: bool,
    forgotten_provider: Option<ProviderKind>,
}

pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let previous = ctx.remembered_provider();
    ctx.auth.logout().await?;

    output(
        &LogoutResponse {
            logged_out: true,
            forgotten_provider: (!previous.is_none()).then_some(previous),
        },
        flags.format,
    )
}
