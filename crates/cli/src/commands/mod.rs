//! Subcommand implementations.

pub mod cart;
pub mod checkout;

use thiserror::Error;

use shopcart_client::ConfigError;
use shopcart_core::{CartError, IdParseError};

/// Errors that can end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Environment is missing or malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// A cart operation failed; the text is the shopper-facing message.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// A cart line id given on the command line is not a number.
    #[error(transparent)]
    InvalidId(#[from] IdParseError),
}

impl CommandError {
    /// Process exit code: 2 for input the user can correct without
    /// contacting the service, 1 otherwise.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Cart(err) if err.is_validation() => 2,
            Self::Config(_) | Self::InvalidId(_) => 2,
            Self::Client(_) | Self::Cart(_) => 1,
        }
    }
}
