//! CLI argument parsing
//!
//! Uses clap for argument parsing with derive macros. The notification
//! fields double as long flags; `to_params()` lowers them into the same
//! string map every other trigger produces, so all three paths share one
//! constructor.

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

/// Desktop notification agent - popups and banners triggered by CLI, deep links or push payloads
#[derive(Parser, Debug)]
#[command(name = "herald")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Configuration file path (default: ~/.config/herald/config.toml)
    #[arg(short, long, env = "HERALD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub notification: NotificationArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trigger from a deep-link URL (requires deep-link security enabled)
    Url {
        /// The custom-scheme URL, e.g. herald://shownotification?type=popup&title=Hi
        url: String,
    },

    /// Trigger from a push-notification payload
    ///
    /// The payload is a flat JSON object of scalar values, passed inline or
    /// piped as the first line of stdin.
    Push {
        /// Inline JSON payload (default: read one line from stdin)
        payload: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Notification fields exposed as flags for the CLI trigger
#[derive(Args, Debug, Default)]
pub struct NotificationArgs {
    /// UI style: banner, popup or alert
    #[arg(long = "type", value_name = "STYLE")]
    pub style: Option<String>,

    /// Title line
    #[arg(long)]
    pub title: Option<String>,

    /// Subtitle, rendered below the title
    #[arg(long)]
    pub subtitle: Option<String>,

    /// Path of a custom icon
    #[arg(long)]
    pub icon_path: Option<String>,

    /// Main button label (defaults when omitted)
    #[arg(long)]
    pub main_button: Option<String>,

    /// Main button call-to-action payload
    #[arg(long)]
    pub main_button_cta: Option<String>,

    /// Secondary button label
    #[arg(long)]
    pub secondary_button: Option<String>,

    /// Secondary button call-to-action payload
    #[arg(long)]
    pub secondary_button_cta: Option<String>,

    /// Tertiary button label
    #[arg(long)]
    pub tertiary_button: Option<String>,

    /// Tertiary button call-to-action payload
    #[arg(long)]
    pub tertiary_button_cta: Option<String>,

    /// Help button payload (not allowed for banners)
    #[arg(long)]
    pub help_button: Option<String>,

    /// Help button behavior: infopopup (default) or link
    #[arg(long, value_name = "KIND")]
    pub help_button_cta_type: Option<String>,

    /// Timer accessory label; counts down `--timeout` seconds
    #[arg(long)]
    pub timer: Option<String>,

    /// Whitebox accessory text
    #[arg(long)]
    pub whitebox: Option<String>,

    /// Progress-bar accessory initial state (slash-command syntax)
    #[arg(long)]
    pub progressbar: Option<String>,

    /// Image accessory file path
    #[arg(long)]
    pub image: Option<String>,

    /// Video accessory file path
    #[arg(long)]
    pub video: Option<String>,

    /// Input accessory placeholder
    #[arg(long)]
    pub input: Option<String>,

    /// Secured input accessory placeholder
    #[arg(long)]
    pub secured_input: Option<String>,

    /// Seconds before the notification times out
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Window bar title
    #[arg(long)]
    pub bar_title: Option<String>,

    /// Keep the window above all others
    #[arg(long, default_value_t = false)]
    pub always_on_top: bool,
}

impl NotificationArgs {
    /// Lower the flags into the common parameter map
    pub fn to_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        let fields: [(&str, &Option<String>); 17] = [
            ("type", &self.style),
            ("title", &self.title),
            ("subtitle", &self.subtitle),
            ("icon_path", &self.icon_path),
            ("main_button", &self.main_button),
            ("main_button_cta", &self.main_button_cta),
            ("secondary_button", &self.secondary_button),
            ("secondary_button_cta", &self.secondary_button_cta),
            ("tertiary_button", &self.tertiary_button),
            ("tertiary_button_cta", &self.tertiary_button_cta),
            ("helpbutton", &self.help_button),
            ("helpbutton_cta_type", &self.help_button_cta_type),
            ("timer", &self.timer),
            ("whitebox", &self.whitebox),
            ("progressbar", &self.progressbar),
            ("image", &self.image),
            ("video", &self.video),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                if !value.is_empty() {
                    params.insert(key.to_string(), value.clone());
                }
            }
        }
        if let Some(input) = &self.input {
            params.insert("input".to_string(), input.clone());
        }
        if let Some(secured) = &self.secured_input {
            params.insert("securedinput".to_string(), secured.clone());
        }
        if let Some(timeout) = self.timeout {
            params.insert("timeout".to_string(), timeout.to_string());
        }
        if let Some(bar_title) = &self.bar_title {
            params.insert("bar_title".to_string(), bar_title.clone());
        }
        if self.always_on_top {
            params.insert("always_on_top".to_string(), "true".to_string());
        }
        params
    }

    /// True when no notification flag was given at all
    pub fn is_empty(&self) -> bool {
        self.to_params().is_empty()
    }
}

/// Generate shell completions and print to stdout
pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "herald", &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_lower_to_params() {
        let cli = Cli::try_parse_from([
            "herald",
            "--type",
            "popup",
            "--title",
            "Maintenance",
            "--secondary-button",
            "Later",
            "--timeout",
            "120",
            "--always-on-top",
        ])
        .unwrap();
        let params = cli.notification.to_params();
        assert_eq!(params.get("type").map(String::as_str), Some("popup"));
        assert_eq!(params.get("title").map(String::as_str), Some("Maintenance"));
        assert_eq!(
            params.get("secondary_button").map(String::as_str),
            Some("Later")
        );
        assert_eq!(params.get("timeout").map(String::as_str), Some("120"));
        assert_eq!(params.get("always_on_top").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_help_button_flags_use_model_keys() {
        let cli = Cli::try_parse_from([
            "herald",
            "--type",
            "popup",
            "--title",
            "T",
            "--help-button",
            "More details",
            "--help-button-cta-type",
            "link",
        ])
        .unwrap();
        let params = cli.notification.to_params();
        assert_eq!(
            params.get("helpbutton").map(String::as_str),
            Some("More details")
        );
        assert_eq!(
            params.get("helpbutton_cta_type").map(String::as_str),
            Some("link")
        );
    }

    #[test]
    fn test_secured_input_key() {
        let cli =
            Cli::try_parse_from(["herald", "--type", "popup", "--secured-input", "Password"])
                .unwrap();
        let params = cli.notification.to_params();
        assert_eq!(
            params.get("securedinput").map(String::as_str),
            Some("Password")
        );
    }

    #[test]
    fn test_no_flags_is_empty() {
        let cli = Cli::try_parse_from(["herald"]).unwrap();
        assert!(cli.notification.is_empty());
    }

    #[test]
    fn test_url_subcommand() {
        let cli = Cli::try_parse_from(["herald", "url", "herald://shownotification?type=popup"])
            .unwrap();
        match cli.command {
            Some(Commands::Url { url }) => {
                assert_eq!(url, "herald://shownotification?type=popup");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
