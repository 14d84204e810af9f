//! Desktop presentation of notification objects
//!
//! Uses notify-rust for native notifications on macOS, Linux, and BSD.
//! Window rendering, layout and accessory visuals belong to the platform
//! presentation layer; this module is the seam the core hands objects to.

use notify_rust::Notification;

use crate::config::PresentationConfig;
use crate::notification::{NotificationObject, NotificationStyle};

/// Presentation collaborator consumed by the dispatch loop
pub trait Presenter {
    /// Show the notification. User actions flow back through the event
    /// channel, not through this trait.
    fn present(&self, object: &NotificationObject);
}

/// Default presenter backed by native desktop notifications
#[derive(Debug, Clone)]
pub struct DesktopPresenter {
    defaults: PresentationConfig,
}

impl DesktopPresenter {
    pub fn new(defaults: PresentationConfig) -> Self {
        Self { defaults }
    }
}

impl Presenter for DesktopPresenter {
    fn present(&self, object: &NotificationObject) {
        let summary = object
            .bar_title
            .clone()
            .or_else(|| object.title.clone())
            .unwrap_or_else(|| self.defaults.default_bar_title.clone());
        let body = match (&object.title, &object.subtitle) {
            (Some(title), Some(subtitle)) => format!("{title}\n{subtitle}"),
            (Some(text), None) | (None, Some(text)) => text.clone(),
            (None, None) => String::new(),
        };
        let icon = object
            .icon_path
            .clone()
            .or_else(|| self.defaults.default_icon_path.clone());

        let mut notification = Notification::new();
        notification.summary(&summary).body(&body);
        if let Some(icon) = icon {
            notification.icon(&icon);
        }
        if object.style == NotificationStyle::Banner {
            if let Some(timeout) = object.effective_timeout() {
                notification.timeout(i32::try_from(timeout.saturating_mul(1000)).unwrap_or(i32::MAX));
            }
        }

        // Spawn async - don't block the dispatch loop on the desktop bus
        std::thread::spawn(move || {
            if let Err(e) = notification.show() {
                tracing::warn!(error = %e, "Failed to show desktop notification");
            }
        });

        tracing::info!(style = ?object.style, "Notification presented");
    }
}
