use anyhow::Context;
use serde::Serialize;
use warden_core::{PurchaseReceiptEnvelope, ValidationOutcome};
use warden_receipts::{PurchaseCompletion, PurchaseEvent, PurchasedProduct};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ValidateReceiptArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct ValidateReceiptResponse {
    completion: PurchaseCompletion,
    #[serde(flatten)]
    outcome: ValidationOutcome,
}

pub async fn handle(
    args: &ValidateReceiptArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let receipt = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read receipt {}", args.file.display()))?;

    // Without a session the validator reports "not authenticated" itself.
    if let Err(error) = ctx.ensure_session().await {
        tracing::warn!(%error, "validating without a session");
    }

    let receipt = receipt.trim().to_string();
    let transaction_id = PurchaseReceiptEnvelope::parse(&receipt)
        .map(|envelope| envelope.transaction_id)
        .unwrap_or_default();

    ctx.receipts.set_purchasing_initialized(true);
    let event = PurchaseEvent::new(PurchasedProduct {
        product_id: args.product_id.clone(),
        transaction_id,
        receipt,
        iso_currency_code: args.currency.clone(),
        localized_price: args.price,
    });
    let (completion, outcome) = ctx.receipts.complete_purchase(&event).await;

    output(&ValidateReceiptResponse { completion, outcome }, flags.format)
}
