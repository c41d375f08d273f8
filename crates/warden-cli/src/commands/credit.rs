use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CreditArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct CreditResponse {
    code: String,
    credited: u32,
    balance: u64,
}

pub async fn handle(args: &CreditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.ensure_session().await?;
    let balance = ctx.inventory.credit_currency(&args.code, args.amount).await?;

    output(
        &CreditResponse {
            code: args.code.clone(),
            credited: args.amount,
            balance,
        },
        flags.format,
    )
}
