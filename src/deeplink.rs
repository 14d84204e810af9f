//! Deep-link URL parsing
//!
//! Herald can be activated through a custom-scheme URL such as
//! `herald://shownotification?type=popup&title=Hello&token=...`. Parsing is a
//! sequence of gates, each short-circuiting to its own error: URL structure,
//! the single accepted route, non-empty parameters, then (in security mode)
//! token verification. The surviving parameter map feeds the same
//! notification constructor as every other trigger.

use std::collections::BTreeMap;

use tokio::sync::mpsc;
use url::Url;

use crate::config::SecurityConfig;
use crate::errors::DeepLinkError;
use crate::event::Event;
use crate::notification::NotificationObject;
use crate::token;

/// The only route ever accepted. Security boundary: any other path is
/// rejected before parameters are even looked at.
const NOTIFICATION_ROUTE: &str = "shownotification";

/// Parses deep-link URLs into notification objects
#[derive(Debug, Clone)]
pub struct DeepLinkEngine {
    security: SecurityConfig,
}

impl DeepLinkEngine {
    pub fn new(security: SecurityConfig) -> Self {
        Self { security }
    }

    /// Parse and validate a deep-link URL, publish the resulting
    /// notification
    ///
    /// A failed deep link is logged and produces no UI; it never crashes the
    /// process. Exactly one show event is published per successful call.
    pub fn process_url(&self, raw: &str, tx: &mpsc::Sender<Event>) -> Result<(), DeepLinkError> {
        tracing::info!("Deep-link engine started parsing received URL");
        match self.parse(raw) {
            Ok(object) => {
                tracing::info!("Deep-link engine finished parsing received URL");
                if tx
                    .try_send(Event::ShowNotification(Box::new(object)))
                    .is_err()
                {
                    tracing::error!("Event channel unavailable, dropping notification");
                }
                Ok(())
            }
            Err(e) => {
                // Never log the URL itself here: it may carry a token.
                tracing::error!(error = %e, "Deep-link error, no UI will be shown for the URL");
                Err(e)
            }
        }
    }

    /// Parse a deep-link URL into a validated notification object
    pub fn parse(&self, raw: &str) -> Result<NotificationObject, DeepLinkError> {
        let url = Url::parse(raw).map_err(|_| DeepLinkError::FailedToGetComponents)?;

        // `scheme://shownotification?...` puts the route in the host,
        // `scheme:shownotification?...` puts it in the path. Accept both,
        // and nothing more: with the route in the host, any trailing path
        // segment widens the single accepted route and is rejected.
        let route_ok = match url.host_str() {
            Some(host) if !host.is_empty() => {
                host == NOTIFICATION_ROUTE && matches!(url.path(), "" | "/")
            }
            _ => url.path().trim_start_matches('/') == NOTIFICATION_ROUTE,
        };
        if !route_ok {
            return Err(DeepLinkError::UnsupportedPath);
        }

        let mut params: BTreeMap<String, String> = url
            .query_pairs()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        if params.is_empty() {
            return Err(DeepLinkError::NoParametersFound);
        }

        if self.security.deeplink_security {
            let Some(token) = params.remove("token") else {
                return Err(DeepLinkError::InvalidToken);
            };
            if !token::verify(&token, self.security.deeplink_security_key.as_bytes()) {
                return Err(DeepLinkError::InvalidToken);
            }
        }
        // Weaker posture by configuration: with security disabled the token
        // gate is skipped entirely and the link is trusted as-is.

        Ok(NotificationObject::from_params(&params)?)
    }
}
