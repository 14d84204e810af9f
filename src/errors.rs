//! Structured error types for herald
//!
//! Uses thiserror for ergonomic error definitions with automatic Display
//! and Error trait implementations. The taxonomy is split into closed sets
//! per boundary: model construction, deep-link handling, and CLI startup.

use thiserror::Error;

/// Errors raised while building a `NotificationObject` from a parameter map
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The `type` parameter is missing or not a supported UI style
    #[error("no notification \"type\" parameter defined")]
    NoTypeDefined,

    /// Nothing to render: no title, subtitle or accessory payload
    #[error("no info to show for the desired UI type; define the mandatory fields for the style")]
    NoInfoToShow,

    /// A button key was supplied without a usable label or payload
    #[error("no button defined")]
    NoButtonDefined,

    /// Banners cannot carry a help button
    #[error("a help button is not allowed in a \"banner\" UI type")]
    NoHelpButtonAllowedInNotification,

    /// Push payload was not a JSON object of scalar values
    #[error("invalid JSON payload")]
    InvalidJsonPayload,

    /// Push payload failed to decode as JSON at all
    #[error("invalid JSON format: {0}")]
    InvalidJsonDecoding(String),
}

/// Errors raised while parsing a deep-link URL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeepLinkError {
    /// The URL could not be decomposed into components
    #[error("failed to get URL's components")]
    FailedToGetComponents,

    /// The URL route is not the notification route
    #[error("URL's path is not supported")]
    UnsupportedPath,

    /// No usable query parameters after stripping empty values
    #[error("failed to get URL's parameters")]
    NoParametersFound,

    /// Security mode is on and the token is missing or failed verification
    #[error("unauthorized request")]
    InvalidToken,

    /// The deep-link trigger is refused while security mode is off
    #[error("deep link security is not enabled")]
    SecurityDisabled,

    /// The parameter map did not build a valid notification object
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors raised while interpreting command-line arguments at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// Arguments could not be interpreted as notification parameters
    #[error("invalid arguments syntax")]
    InvalidArgumentsSyntax,

    /// Arguments parsed but failed to build a notification object
    #[error("error while creating notification object from arguments: {0}")]
    ErrorBuildingNotificationObject(ModelError),
}

/// All possible errors in herald
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeraldError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    DeepLink(#[from] DeepLinkError),

    #[error(transparent)]
    Cli(#[from] CliError),
}

impl HeraldError {
    /// Exit reason the process should report when this error is fatal
    pub fn exit_reason(&self) -> crate::reply::ExitReason {
        use crate::reply::ExitReason;
        match self {
            HeraldError::Cli(CliError::InvalidArgumentsSyntax) => {
                ExitReason::InvalidArgumentsSyntax
            }
            HeraldError::Cli(CliError::ErrorBuildingNotificationObject(_)) => {
                ExitReason::InvalidArgumentFormat
            }
            _ => ExitReason::InternalError,
        }
    }
}

/// Convenience Result type using HeraldError
pub type Result<T> = std::result::Result<T, HeraldError>;
