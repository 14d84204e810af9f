//! Trigger router
//!
//! Three external triggers can start the pipeline: CLI arguments, a
//! deep-link URL, and a push payload. Whichever arrives first performs the
//! one-time process setup; a compare-and-swap latch guarantees exactly one
//! setup even when triggers race. Every trigger normalizes its input into
//! the common parameter map and publishes at most one show event.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use crate::config::HeraldConfig;
use crate::deeplink::DeepLinkEngine;
use crate::errors::{self, CliError, DeepLinkError, HeraldError, ModelError};
use crate::event::Event;
use crate::notification::NotificationObject;

type SetupFn = Box<dyn Fn() + Send + Sync>;

/// Coordinates the three trigger entry points
pub struct TriggerRouter {
    configured: AtomicBool,
    engine: DeepLinkEngine,
    deeplink_enabled: bool,
    tx: mpsc::Sender<Event>,
    on_setup: SetupFn,
}

impl TriggerRouter {
    /// `on_setup` runs exactly once, inside the first `configure` call
    pub fn new(config: &HeraldConfig, tx: mpsc::Sender<Event>, on_setup: SetupFn) -> Self {
        Self {
            configured: AtomicBool::new(false),
            engine: DeepLinkEngine::new(config.security.clone()),
            deeplink_enabled: config.security.deeplink_security,
            tx,
            on_setup,
        }
    }

    /// Idempotent one-time setup
    ///
    /// The first caller wins the latch and runs the setup; every caller,
    /// first or not, gets its continuation invoked.
    pub fn configure<F: FnOnce()>(&self, continuation: F) {
        if self
            .configured
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            tracing::info!("Performing one-time agent setup");
            (self.on_setup)();
        }
        continuation();
    }

    /// CLI-argument trigger, always allowed
    pub fn trigger_cli(&self, params: &BTreeMap<String, String>) -> errors::Result<()> {
        let mut result = Ok(());
        self.configure(|| {
            tracing::info!("Agent triggered by command-line arguments");
            result = self
                .publish(params, false)
                .map_err(|e| CliError::ErrorBuildingNotificationObject(e).into());
        });
        result
    }

    /// Deep-link trigger, gated by the security configuration flag
    ///
    /// With security disabled the trigger is refused outright: no setup, no
    /// continuation, just an error log.
    pub fn trigger_url(&self, raw: &str) -> errors::Result<()> {
        if !self.deeplink_enabled {
            tracing::error!("Deep link refused: deep-link security must be enabled to use deep links");
            return Err(DeepLinkError::SecurityDisabled.into());
        }
        let mut result = Ok(());
        self.configure(|| {
            tracing::info!("Agent triggered by a URL");
            result = self
                .engine
                .process_url(raw, &self.tx)
                .map_err(HeraldError::from);
        });
        result
    }

    /// Push-notification trigger, always allowed
    ///
    /// The payload is a single JSON object of scalar values; it is flattened
    /// into the common parameter map and the resulting object is marked as
    /// push-originated.
    pub fn trigger_push(&self, payload: &str) -> errors::Result<()> {
        let mut result = Ok(());
        self.configure(|| {
            tracing::info!("Agent triggered by a push notification");
            result = match Self::flatten_payload(payload) {
                Ok(params) => self.publish(&params, true).map_err(HeraldError::from),
                Err(e) => {
                    tracing::error!(error = %e, "Push payload rejected, no UI will be shown");
                    Err(e.into())
                }
            };
        });
        result
    }

    /// Build, validate and publish one notification object
    fn publish(
        &self,
        params: &BTreeMap<String, String>,
        from_push: bool,
    ) -> Result<(), ModelError> {
        let mut object = NotificationObject::from_params(params)?;
        if from_push {
            object = object.mark_push_triggered();
        }
        if self
            .tx
            .try_send(Event::ShowNotification(Box::new(object)))
            .is_err()
        {
            tracing::error!("Event channel unavailable, dropping notification");
        }
        Ok(())
    }

    /// Flatten a JSON object of scalars into the common string map
    fn flatten_payload(payload: &str) -> Result<BTreeMap<String, String>, ModelError> {
        let value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|e| ModelError::InvalidJsonDecoding(e.to_string()))?;
        let serde_json::Value::Object(map) = value else {
            return Err(ModelError::InvalidJsonPayload);
        };

        let mut params = BTreeMap::new();
        for (key, value) in map {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Null => continue,
                _ => return Err(ModelError::InvalidJsonPayload),
            };
            if !value.is_empty() {
                params.insert(key, value);
            }
        }
        Ok(params)
    }
}
