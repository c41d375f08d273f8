use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::BuyArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct BuyResponse {
    item: String,
    granted: Vec<String>,
    currencies: std::collections::BTreeMap<String, u64>,
}

pub async fn handle(args: &BuyArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.ensure_session().await?;
    let granted = ctx
        .inventory
        .purchase_item(&args.item, args.currency.as_deref())
        .await?;
    // The purchase marked the cache dirty; show balances after the spend.
    let snapshot = ctx.inventory.poll().await?;

    output(
        &BuyResponse {
            item: args.item.clone(),
            granted,
            currencies: snapshot.currencies.clone(),
        },
        flags.format,
    )
}
