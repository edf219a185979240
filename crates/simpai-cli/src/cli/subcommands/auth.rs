use clap::{Args, Subcommand};

/// Account commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Create an account and store its token.
    Register(AuthRegisterArgs),
    /// Log in with email and password.
    Login(AuthLoginArgs),
    /// Invalidate the token and clear local state.
    Logout,
    /// Show where the stored token comes from.
    Status,
    /// Show the account profile (cached for offline use).
    Profile,
    /// Email a password reset link.
    ResetPassword(AuthEmailArgs),
    /// Set a new password with the token from the reset email.
    ConfirmReset(AuthConfirmResetArgs),
    /// Send the verification email again.
    ResendConfirmation(AuthEmailArgs),
}

#[derive(Clone, Debug, Args)]
pub struct AuthRegisterArgs {
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub first_name: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct AuthLoginArgs {
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Clone, Debug, Args)]
pub struct AuthEmailArgs {
    pub email: String,
}

#[derive(Clone, Debug, Args)]
pub struct AuthConfirmResetArgs {
    /// Token from the reset link.
    pub token: String,
    #[arg(long)]
    pub password: String,
    /// Repeat the new password.
    #[arg(long)]
    pub confirm: String,
}
