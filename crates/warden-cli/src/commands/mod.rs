pub mod buy;
pub mod credit;
pub mod inventory;
pub mod login;
pub mod logout;
pub mod status;
pub mod validate_receipt;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Login(args) => login::handle(&args, ctx, flags).await,
        Commands::Logout => logout::handle(ctx, flags).await,
        Commands::Inventory(args) => inventory::handle(&args, ctx, flags).await,
        Commands::Credit(args) => credit::handle(&args, ctx, flags).await,
        Commands::Buy(args) => buy::handle(&args, ctx, flags).await,
        Commands::ValidateReceipt(args) => validate_receipt::handle(&args, ctx, flags).await,
        Commands::Status => unreachable!("status is pre-dispatched in main"),
    }
}
