use clap::{Args, Subcommand};

/// Billing commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SubscriptionCommands {
    /// Show the current subscription.
    Status,
    /// List plan prices.
    Prices(PricesArgs),
    /// Print a checkout link.
    Checkout,
}

#[derive(Clone, Debug, Args)]
pub struct PricesArgs {
    #[arg(long, default_value = "month", value_parser = ["month", "year"])]
    pub interval: String,
}
