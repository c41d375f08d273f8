use std::time::Duration;

use warden_core::InventoryEvent;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InventoryArgs;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(
    args: &InventoryArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    ctx.ensure_session().await?;

    let Some(secs) = args.watch else {
        let snapshot = ctx.inventory.poll().await?;
        return output(snapshot.as_ref(), flags.format);
    };

    let mut events = ctx.inventory.subscribe();
    let refresh = ctx
        .inventory
        .spawn_refresh_loop(ctx.config.inventory.tick_period());
    let deadline = tokio::time::sleep(Duration::from_secs(secs));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => break,
            event = events.recv() => match event {
                Ok(InventoryEvent::Refreshed) => output(ctx.inventory.snapshot().as_ref(), flags.format)?,
                Ok(InventoryEvent::Error { reason }) => tracing::warn!(%reason, "inventory refresh failed"),
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "inventory watcher lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    refresh.stop();
    Ok(())
}
