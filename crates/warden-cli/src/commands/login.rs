use anyhow::Context;
use serde::Serialize;
use warden_auth::AuthParams;
use warden_config::WardenConfig;
use warden_core::ProviderKind;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{LoginArgs, LoginProvider};
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct LoginResponse {
    player_id: String,
    provider: ProviderKind,
    newly_created: bool,
}

/// Route `--token` into the config section that registers the matching
/// provider, before the application context is built.
pub fn apply_token(config: &mut WardenConfig, args: &LoginArgs) -> anyhow::Result<()> {
    let Some(token) = args.token.clone() else {
        return Ok(());
    };
    match args.provider {
        LoginProvider::Social => config.auth.social_token = token,
        LoginProvider::Platform => config.auth.platform_auth_code = token,
        LoginProvider::Device | LoginProvider::Password => {
            anyhow::bail!("--token only applies to social and platform login");
        }
    }
    Ok(())
}

pub async fn handle(args: &LoginArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let session = if args.provider == LoginProvider::Password {
        let username = args
            .username
            .as_deref()
            .context("--username is required for password login")?;
        let password = args
            .password
            .as_deref()
            .context("--password is required for password login")?;
        if args.register {
            ctx.auth
                .register(username, password, args.email.as_deref())
                .await?
        } else {
            ctx.auth.login_with_password(username, password).await?
        }
    } else {
        if args.username.is_some() || args.password.is_some() {
            anyhow::bail!("--username/--password only apply to password login");
        }
        if !ctx.auth.providers().supports(args.provider.kind()) {
            anyhow::bail!(
                "{} login needs a credential: pass --token or set auth.{}",
                args.provider.kind(),
                if args.provider == LoginProvider::Platform {
                    "platform_auth_code"
                } else {
                    "social_token"
                }
            );
        }
        ctx.auth
            .login(args.provider.kind(), &AuthParams::default())
            .await?
    };

    output(
        &LoginResponse {
            player_id: session.player_id.clone(),
            provider: session.provider_kind,
            newly_created: session.newly_created,
        },
        flags.format,
    )
}
