use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use warden_core::ProviderKind;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Log in and remember the provider for later commands.
    Login(LoginArgs),
    /// End the session and forget the remembered provider.
    Logout,
    /// Show configuration and login state.
    Status,
    /// Show the player's inventory.
    Inventory(InventoryArgs),
    /// Grant virtual currency.
    Credit(CreditArgs),
    /// Buy a catalog item with virtual currency.
    Buy(BuyArgs),
    /// Validate a store purchase receipt with the backend.
    ValidateReceipt(ValidateReceiptArgs),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum LoginProvider {
    /// Anonymous per-install device id.
    Device,
    /// Social network access token.
    Social,
    /// Platform game-services account.
    Platform,
    /// Backend username and password.
    Password,
}

impl LoginProvider {
    pub const fn kind(self) -> ProviderKind {
        match self {
            Self::Device => ProviderKind::Device,
            Self::Social => ProviderKind::SocialToken,
            Self::Platform => ProviderKind::PlatformAccount,
            Self::Password => ProviderKind::Password,
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct LoginArgs {
    /// Identity provider to log in with.
    pub provider: LoginProvider,

    /// Username (password login only).
    #[arg(long)]
    pub username: Option<String>,

    /// Password (password login only).
    #[arg(long)]
    pub password: Option<String>,

    /// Create the account instead of logging into an existing one.
    #[arg(long, requires = "username")]
    pub register: bool,

    /// Email for the new account (with --register).
    #[arg(long, requires = "register")]
    pub email: Option<String>,

    /// Social access token or platform server auth code, obtained from the
    /// provider's own SDK. Overrides auth.social_token / auth.platform_auth_code.
    #[arg(long, conflicts_with_all = ["username", "password"])]
    pub token: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct InventoryArgs {
    /// Keep refreshing for this many seconds, printing every new snapshot.
    #[arg(long, value_name = "SECS")]
    pub watch: Option<u64>,
}

#[derive(Clone, Debug, Args)]
pub struct CreditArgs {
    /// Currency code (e.g. GE).
    pub code: String,
    /// Amount to add.
    pub amount: u32,
}

#[derive(Clone, Debug, Args)]
pub struct BuyArgs {
    /// Catalog item id.
    pub item: String,
    /// Pay with this currency instead of the item's default price.
    #[arg(long)]
    pub currency: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ValidateReceiptArgs {
    /// File holding the store receipt envelope.
    pub file: PathBuf,
    /// ISO 4217 currency code of the price paid.
    #[arg(long)]
    pub currency: String,
    /// Price paid, in major units (e.g. 1.99).
    #[arg(long)]
    pub price: f64,
    /// Store product id.
    #[arg(long, default_value = "unknown")]
    pub product_id: String,
}
