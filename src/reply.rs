//! Reply/dispatch protocol
//!
//! Every shown notification resolves to exactly one structured reply. The
//! reply is printed to stdout as a single JSON line (the agent's IPC
//! surface) and mapped to a process exit code. A latch guarantees the
//! exactly-once contract: the first closing reply wins, later UI events are
//! swallowed.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// The possible responses to a shown notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyKind {
    Main,
    Secondary,
    Tertiary,
    Help,
    Cancel,
    Timeout,
}

impl FromStr for ReplyKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(Self::Main),
            "secondary" => Ok(Self::Secondary),
            "tertiary" => Ok(Self::Tertiary),
            "help" => Ok(Self::Help),
            "cancel" => Ok(Self::Cancel),
            "timeout" => Ok(Self::Timeout),
            _ => Err(()),
        }
    }
}

impl ReplyKind {
    /// Exit reason reported when this reply closes the agent
    pub fn exit_reason(self) -> ExitReason {
        match self {
            // A help call-to-action resolves like the main action
            Self::Main | Self::Help => ExitReason::Main,
            Self::Secondary => ExitReason::Secondary,
            Self::Tertiary => ExitReason::Tertiary,
            Self::Cancel => ExitReason::Cancel,
            Self::Timeout => ExitReason::Timeout,
        }
    }
}

/// Why the agent exited; the numeric code is the process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Main,
    UntimelyExit,
    Secondary,
    Tertiary,
    Timeout,
    Cancel,
    ReceivedSigInt,
    InvalidArgumentsSyntax,
    InvalidArgumentFormat,
    InternalError,
}

impl ExitReason {
    /// Process exit status. On Unix only the low 8 bits survive
    /// `process::exit`, so every code must stay within 0..=255.
    pub fn code(self) -> i32 {
        match self {
            Self::Main => 0,
            Self::UntimelyExit => 1,
            Self::Secondary => 2,
            Self::Tertiary => 3,
            Self::Timeout => 4,
            Self::Cancel => 5,
            Self::ReceivedSigInt => 201,
            Self::InternalError => 210,
            Self::InvalidArgumentsSyntax => 250,
            Self::InvalidArgumentFormat => 255,
        }
    }
}

/// The structured outcome delivered on the reply channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPayload {
    pub kind: ReplyKind,
    /// Free-form data, e.g. the input-field value on a `main` reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Emits the reply for one notification, exactly once
///
/// One handler per `NotificationObject` instance. Duplicate clicks, a stale
/// timeout timer racing a click, or any other late event after the first
/// closing reply are ignored.
#[derive(Debug, Default)]
pub struct ReplyHandler {
    emitted: AtomicBool,
}

impl ReplyHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a closing reply, unless one was already emitted
    ///
    /// Returns the exit reason on the first call and `None` on every later
    /// call. Reply data is never logged; secured input rides in the payload
    /// only.
    pub fn handle_response(&self, kind: ReplyKind, data: Option<String>) -> Option<ExitReason> {
        if self
            .emitted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(?kind, "Reply already emitted, ignoring");
            return None;
        }

        let payload = ReplyPayload { kind, data };
        match serde_json::to_string(&payload) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(error = %e, "Failed to serialize reply payload"),
        }
        tracing::info!(?kind, "Reply emitted");
        Some(kind.exit_reason())
    }

    /// Whether a closing reply has already been emitted
    pub fn is_closed(&self) -> bool {
        self.emitted.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_is_emitted_exactly_once() {
        let handler = ReplyHandler::new();
        assert_eq!(
            handler.handle_response(ReplyKind::Main, None),
            Some(ExitReason::Main)
        );
        // Duplicate click
        assert_eq!(handler.handle_response(ReplyKind::Main, None), None);
        // Stale timeout after close
        assert_eq!(handler.handle_response(ReplyKind::Timeout, None), None);
        assert!(handler.is_closed());
    }

    #[test]
    fn test_first_response_wins() {
        let handler = ReplyHandler::new();
        assert_eq!(
            handler.handle_response(ReplyKind::Secondary, None),
            Some(ExitReason::Secondary)
        );
        assert_eq!(handler.handle_response(ReplyKind::Tertiary, None), None);
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(ReplyKind::Main.exit_reason().code(), 0);
        assert_eq!(ReplyKind::Help.exit_reason().code(), 0);
        assert_eq!(ReplyKind::Secondary.exit_reason().code(), 2);
        assert_eq!(ReplyKind::Tertiary.exit_reason().code(), 3);
        assert_eq!(ReplyKind::Timeout.exit_reason().code(), 4);
        assert_eq!(ReplyKind::Cancel.exit_reason().code(), 5);
        assert_eq!(ExitReason::ReceivedSigInt.code(), 201);
        assert_eq!(ExitReason::InternalError.code(), 210);
        assert_eq!(ExitReason::InvalidArgumentsSyntax.code(), 250);
    }

    #[test]
    fn test_exit_codes_fit_in_a_byte_and_are_distinct() {
        // Unix reports only the low 8 bits of the exit status; a code above
        // 255 would alias another reason after truncation.
        let reasons = [
            ExitReason::Main,
            ExitReason::UntimelyExit,
            ExitReason::Secondary,
            ExitReason::Tertiary,
            ExitReason::Timeout,
            ExitReason::Cancel,
            ExitReason::ReceivedSigInt,
            ExitReason::InternalError,
            ExitReason::InvalidArgumentsSyntax,
            ExitReason::InvalidArgumentFormat,
        ];
        let mut seen = std::collections::BTreeSet::new();
        for reason in reasons {
            let code = reason.code();
            assert!((0..=255).contains(&code), "{reason:?} code {code} overflows a byte");
            assert!(seen.insert(code), "{reason:?} code {code} collides");
        }
    }

    #[test]
    fn test_payload_serialization_shape() {
        let payload = ReplyPayload {
            kind: ReplyKind::Main,
            data: Some("typed value".to_string()),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"kind":"main","data":"typed value"}"#);

        let bare = ReplyPayload {
            kind: ReplyKind::Timeout,
            data: None,
        };
        assert_eq!(serde_json::to_string(&bare).unwrap(), r#"{"kind":"timeout"}"#);
    }

    #[test]
    fn test_reply_kind_parsing() {
        assert_eq!("main".parse::<ReplyKind>(), Ok(ReplyKind::Main));
        assert_eq!("cancel".parse::<ReplyKind>(), Ok(ReplyKind::Cancel));
        assert!("mainbutton".parse::<ReplyKind>().is_err());
    }
}
