//! Canonical notification model
//!
//! Every trigger path (CLI flags, deep link, push payload) is normalized into
//! a string parameter map and fed through [`NotificationObject::from_params`].
//! Construction is a pure function: same map in, same object or error out,
//! no I/O and no global state. The object is immutable after construction and
//! owned by the pipeline invocation that created it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Label substituted when no explicit main button label is supplied
pub const DEFAULT_MAIN_BUTTON_LABEL: &str = "OK";

/// Supported UI presentation styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStyle {
    /// Transient desktop banner
    Banner,
    /// Standard popup window with buttons and accessories
    Popup,
    /// Modal alert
    Alert,
}

impl NotificationStyle {
    fn from_param(value: &str) -> Option<Self> {
        match value {
            "banner" => Some(Self::Banner),
            "popup" => Some(Self::Popup),
            "alert" => Some(Self::Alert),
            _ => None,
        }
    }
}

/// A plain button: label plus optional call-to-action payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationButton {
    pub label: String,
    /// Opaque payload handed back on the reply (e.g. a URL to open)
    pub call_to_action: Option<String>,
}

/// What the help button does when clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HelpCallToAction {
    /// Open an auxiliary info view; no terminal reply is generated
    InfoPopup,
    /// Behave like a terminal action and emit a `help` reply
    Link,
}

/// Help button descriptor: call-to-action kind plus its payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpButton {
    pub call_to_action: HelpCallToAction,
    pub payload: String,
}

/// Optional accessory attached to a notification, at most one per object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AccessoryView {
    /// Countdown label; the countdown fires the main action at zero
    Timer { payload: String },
    /// Boxed markdown text
    Whitebox { payload: String },
    /// Interactive progress bar, state driven over stdin
    Progressbar { payload: String },
    /// Still image, payload is a filesystem path
    Image { path: String },
    /// Video, payload is a filesystem path
    Video { path: String },
    /// Free text input field, payload is the placeholder
    Input { payload: String },
    /// Secured text input; the value must never reach the logs
    SecuredInput { payload: String },
}

/// Accessory keys in precedence order; the first present key wins and the
/// rest are ignored. Unknown keys are never an error.
const ACCESSORY_PRECEDENCE: [&str; 7] = [
    "timer",
    "whitebox",
    "progressbar",
    "image",
    "video",
    "input",
    "securedinput",
];

impl AccessoryView {
    /// Select at most one accessory from the parameter map
    fn from_params(params: &BTreeMap<String, String>) -> Option<Self> {
        for key in ACCESSORY_PRECEDENCE {
            if let Some(value) = params.get(key) {
                let payload = value.clone();
                return Some(match key {
                    "timer" => Self::Timer { payload },
                    "whitebox" => Self::Whitebox { payload },
                    "progressbar" => Self::Progressbar { payload },
                    "image" => Self::Image { path: payload },
                    "video" => Self::Video { path: payload },
                    "input" => Self::Input { payload },
                    "securedinput" => Self::SecuredInput { payload },
                    _ => unreachable!(),
                });
            }
        }
        None
    }

    /// Payload string, used by the "something to show" validation
    fn payload(&self) -> &str {
        match self {
            Self::Timer { payload }
            | Self::Whitebox { payload }
            | Self::Progressbar { payload }
            | Self::Input { payload }
            | Self::SecuredInput { payload } => payload,
            Self::Image { path } | Self::Video { path } => path,
        }
    }

    /// Whether this accessory accepts typed user input
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Input { .. } | Self::SecuredInput { .. })
    }

    /// Whether input typed into this accessory may be logged
    pub fn is_secured(&self) -> bool {
        matches!(self, Self::SecuredInput { .. })
    }
}

/// Canonical, validated notification request
///
/// Immutable after construction; one instance per trigger event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationObject {
    pub style: NotificationStyle,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    /// Existence is checked by the presentation layer, not here
    pub icon_path: Option<String>,
    pub main_button: NotificationButton,
    pub secondary_button: Option<NotificationButton>,
    pub tertiary_button: Option<NotificationButton>,
    pub help_button: Option<HelpButton>,
    pub accessory_view: Option<AccessoryView>,
    /// Generic timeout in seconds; ignored when the accessory is a timer
    pub timeout: Option<u64>,
    pub bar_title: Option<String>,
    pub always_on_top: bool,
    /// Set by the router when the object originated from a push payload
    pub triggered_by_push: bool,
}

impl NotificationObject {
    /// Build a validated notification object from a string parameter map
    ///
    /// Validation order: style first, then "something to show", then the
    /// button invariants. See [`ModelError`] for the failure set.
    pub fn from_params(params: &BTreeMap<String, String>) -> Result<Self, ModelError> {
        let style = params
            .get("type")
            .and_then(|v| NotificationStyle::from_param(v))
            .ok_or(ModelError::NoTypeDefined)?;

        let title = params.get("title").cloned();
        let subtitle = params.get("subtitle").cloned();
        let accessory_view = AccessoryView::from_params(params);

        // Something must be renderable for the resolved style.
        let has_accessory_payload = accessory_view
            .as_ref()
            .is_some_and(|a| !a.payload().is_empty());
        if title.is_none() && subtitle.is_none() && !has_accessory_payload {
            return Err(ModelError::NoInfoToShow);
        }

        let main_button = NotificationButton {
            label: params
                .get("main_button")
                .cloned()
                .unwrap_or_else(|| DEFAULT_MAIN_BUTTON_LABEL.to_string()),
            call_to_action: params.get("main_button_cta").cloned(),
        };
        let secondary_button = Self::optional_button(params, "secondary_button")?;
        let tertiary_button = Self::optional_button(params, "tertiary_button")?;

        let help_button = Self::help_button(params)?;
        if style == NotificationStyle::Banner && help_button.is_some() {
            return Err(ModelError::NoHelpButtonAllowedInNotification);
        }

        Ok(Self {
            style,
            title,
            subtitle,
            icon_path: params.get("icon_path").cloned(),
            main_button,
            secondary_button,
            tertiary_button,
            help_button,
            accessory_view,
            timeout: params.get("timeout").and_then(|v| v.parse().ok()),
            bar_title: params.get("bar_title").cloned(),
            always_on_top: params
                .get("always_on_top")
                .is_some_and(|v| v == "true" || v == "1"),
            triggered_by_push: false,
        })
    }

    /// Build a secondary or tertiary button if its keys are present
    ///
    /// A call-to-action without a label is a request for a button that cannot
    /// be rendered, which is a `NoButtonDefined` failure.
    fn optional_button(
        params: &BTreeMap<String, String>,
        key: &str,
    ) -> Result<Option<NotificationButton>, ModelError> {
        let cta_key = format!("{key}_cta");
        match (params.get(key), params.get(&cta_key)) {
            (Some(label), cta) => Ok(Some(NotificationButton {
                label: label.clone(),
                call_to_action: cta.cloned(),
            })),
            (None, Some(_)) => Err(ModelError::NoButtonDefined),
            (None, None) => Ok(None),
        }
    }

    /// Build the help button if the `helpbutton` key is present
    ///
    /// The call-to-action kind defaults to `infopopup`; an unknown kind falls
    /// back to `link` so the click still produces a reply.
    fn help_button(params: &BTreeMap<String, String>) -> Result<Option<HelpButton>, ModelError> {
        let Some(payload) = params.get("helpbutton") else {
            if params.contains_key("helpbutton_cta_type") {
                return Err(ModelError::NoButtonDefined);
            }
            return Ok(None);
        };
        if payload.is_empty() {
            return Err(ModelError::NoButtonDefined);
        }
        let call_to_action = match params.get("helpbutton_cta_type").map(String::as_str) {
            None | Some("infopopup") => HelpCallToAction::InfoPopup,
            Some(_) => HelpCallToAction::Link,
        };
        Ok(Some(HelpButton {
            call_to_action,
            payload: payload.clone(),
        }))
    }

    /// Effective timeout: the timer accessory owns its own countdown, so the
    /// generic timeout is ignored while one is present.
    pub fn effective_timeout(&self) -> Option<u64> {
        if matches!(self.accessory_view, Some(AccessoryView::Timer { .. })) {
            return None;
        }
        self.timeout
    }

    /// Mark the object as push-triggered (router responsibility)
    pub fn mark_push_triggered(mut self) -> Self {
        self.triggered_by_push = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_missing_type_fails() {
        let err = NotificationObject::from_params(&params(&[("title", "Hello")])).unwrap_err();
        assert_eq!(err, ModelError::NoTypeDefined);
    }

    #[test]
    fn test_unknown_type_fails() {
        let err =
            NotificationObject::from_params(&params(&[("type", "toast"), ("title", "Hello")]))
                .unwrap_err();
        assert_eq!(err, ModelError::NoTypeDefined);
    }

    #[test]
    fn test_no_info_to_show() {
        let err = NotificationObject::from_params(&params(&[("type", "popup")])).unwrap_err();
        assert_eq!(err, ModelError::NoInfoToShow);
    }

    #[test]
    fn test_accessory_payload_counts_as_info() {
        let object =
            NotificationObject::from_params(&params(&[("type", "popup"), ("whitebox", "body")]))
                .unwrap();
        assert_eq!(
            object.accessory_view,
            Some(AccessoryView::Whitebox {
                payload: "body".to_string()
            })
        );
    }

    #[test]
    fn test_default_main_button_label() {
        let object =
            NotificationObject::from_params(&params(&[("type", "banner"), ("title", "Hello")]))
                .unwrap();
        assert_eq!(object.main_button.label, DEFAULT_MAIN_BUTTON_LABEL);
        assert!(object.main_button.call_to_action.is_none());
    }

    #[test]
    fn test_secondary_cta_without_label_fails() {
        let err = NotificationObject::from_params(&params(&[
            ("type", "popup"),
            ("title", "T"),
            ("secondary_button_cta", "https://example.com"),
        ]))
        .unwrap_err();
        assert_eq!(err, ModelError::NoButtonDefined);
    }

    #[test]
    fn test_banner_rejects_help_button() {
        let err = NotificationObject::from_params(&params(&[
            ("type", "banner"),
            ("title", "T"),
            ("helpbutton", "x"),
        ]))
        .unwrap_err();
        assert_eq!(err, ModelError::NoHelpButtonAllowedInNotification);
    }

    #[test]
    fn test_popup_allows_help_button() {
        let object = NotificationObject::from_params(&params(&[
            ("type", "popup"),
            ("title", "T"),
            ("helpbutton", "x"),
        ]))
        .unwrap();
        let help = object.help_button.unwrap();
        assert_eq!(help.call_to_action, HelpCallToAction::InfoPopup);
        assert_eq!(help.payload, "x");
    }

    #[test]
    fn test_help_button_link_kind() {
        let object = NotificationObject::from_params(&params(&[
            ("type", "popup"),
            ("title", "T"),
            ("helpbutton", "https://example.com"),
            ("helpbutton_cta_type", "link"),
        ]))
        .unwrap();
        assert_eq!(
            object.help_button.unwrap().call_to_action,
            HelpCallToAction::Link
        );
    }

    #[test]
    fn test_accessory_precedence_first_key_wins() {
        let object = NotificationObject::from_params(&params(&[
            ("type", "popup"),
            ("title", "T"),
            ("input", "name"),
            ("timer", "Closing in"),
        ]))
        .unwrap();
        // timer precedes input in the fixed order, regardless of map order
        assert_eq!(
            object.accessory_view,
            Some(AccessoryView::Timer {
                payload: "Closing in".to_string()
            })
        );
    }

    #[test]
    fn test_timer_accessory_suppresses_generic_timeout() {
        let object = NotificationObject::from_params(&params(&[
            ("type", "popup"),
            ("title", "T"),
            ("timer", "Closing in"),
            ("timeout", "30"),
        ]))
        .unwrap();
        assert_eq!(object.timeout, Some(30));
        assert_eq!(object.effective_timeout(), None);
    }

    #[test]
    fn test_generic_timeout_applies_without_timer() {
        let object = NotificationObject::from_params(&params(&[
            ("type", "popup"),
            ("title", "T"),
            ("timeout", "30"),
        ]))
        .unwrap();
        assert_eq!(object.effective_timeout(), Some(30));
    }

    #[test]
    fn test_construction_is_deterministic() {
        let map = params(&[
            ("type", "alert"),
            ("title", "T"),
            ("subtitle", "S"),
            ("secondary_button", "Later"),
            ("always_on_top", "true"),
        ]);
        let first = NotificationObject::from_params(&map).unwrap();
        let second = NotificationObject::from_params(&map).unwrap();
        assert_eq!(first, second);
        assert!(first.always_on_top);
        assert_eq!(first.secondary_button.unwrap().label, "Later");
    }

    #[test]
    fn test_secured_input_is_flagged() {
        let object = NotificationObject::from_params(&params(&[
            ("type", "popup"),
            ("securedinput", "Password"),
        ]))
        .unwrap();
        let accessory = object.accessory_view.unwrap();
        assert!(accessory.is_input());
        assert!(accessory.is_secured());
    }
}
