//! Interactive progress-bar state
//!
//! A progressbar accessory starts from the payload string supplied with the
//! notification and is then driven over stdin with slash-commands
//! (`/percent 40 /top_message Copying files`). Commands are applied strictly
//! in arrival order. While user interruption is allowed, the main action
//! behaves as `cancel`; once the bar completes, the normal buttons return.

/// State of the progress-bar accessory
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    /// 0.0 to 100.0; meaningless while indeterminate
    pub percent: f64,
    pub top_message: String,
    pub bottom_message: String,
    pub is_indeterminate: bool,
    /// Whether the secondary button stays usable during the run
    pub user_interaction_enabled: bool,
    /// Whether the main button acts as a cancel button during the run
    pub user_interruption_allowed: bool,
    /// Set by `/end` or by reaching 100%
    pub ended: bool,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            percent: 0.0,
            top_message: String::new(),
            bottom_message: String::new(),
            is_indeterminate: true,
            user_interaction_enabled: false,
            user_interruption_allowed: false,
            ended: false,
        }
    }
}

impl ProgressState {
    /// Initial state from the accessory payload (same slash-command syntax)
    pub fn from_payload(payload: &str) -> Self {
        let mut state = Self::default();
        state.apply(payload);
        state
    }

    /// Apply one command line to the state
    ///
    /// A line holds one or more `/command value` segments. Unknown commands
    /// are ignored.
    pub fn apply(&mut self, commands: &str) {
        for segment in commands.split('/').map(str::trim).filter(|s| !s.is_empty()) {
            let (command, value) = match segment.split_once(' ') {
                Some((command, value)) => (command, value.trim()),
                None => (segment, ""),
            };
            match command {
                "percent" => {
                    if value.eq_ignore_ascii_case("indeterminate") {
                        self.is_indeterminate = true;
                    } else if let Ok(percent) = value.parse::<f64>() {
                        self.is_indeterminate = false;
                        self.percent = percent.clamp(0.0, 100.0);
                        if self.percent >= 100.0 {
                            self.complete();
                        }
                    }
                }
                "top_message" => self.top_message = value.to_string(),
                "bottom_message" => self.bottom_message = value.to_string(),
                "user_interaction_enabled" => {
                    self.user_interaction_enabled = value != "false";
                }
                "user_interruption_allowed" => {
                    self.user_interruption_allowed = value != "false";
                }
                "end" => self.complete(),
                _ => {}
            }
        }
    }

    /// Mark the run finished: bar full, interruption permission revoked
    pub fn complete(&mut self) {
        self.ended = true;
        self.is_indeterminate = false;
        self.percent = 100.0;
        self.user_interruption_allowed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_indeterminate() {
        let state = ProgressState::default();
        assert!(state.is_indeterminate);
        assert!(!state.user_interruption_allowed);
        assert!(!state.ended);
    }

    #[test]
    fn test_payload_parsing() {
        let state = ProgressState::from_payload(
            "/percent 25 /top_message Downloading /bottom_message step 1 of 4 /user_interruption_allowed",
        );
        assert!(!state.is_indeterminate);
        assert!((state.percent - 25.0).abs() < f64::EPSILON);
        assert_eq!(state.top_message, "Downloading");
        assert_eq!(state.bottom_message, "step 1 of 4");
        assert!(state.user_interruption_allowed);
    }

    #[test]
    fn test_updates_apply_in_order() {
        let mut state = ProgressState::from_payload("/percent indeterminate");
        state.apply("/percent 10 /top_message a");
        state.apply("/percent 60 /top_message b");
        assert!((state.percent - 60.0).abs() < f64::EPSILON);
        assert_eq!(state.top_message, "b");
    }

    #[test]
    fn test_completion_revokes_interruption() {
        let mut state = ProgressState::from_payload("/percent 0 /user_interruption_allowed");
        assert!(state.user_interruption_allowed);
        state.apply("/percent 100");
        assert!(state.ended);
        assert!(!state.user_interruption_allowed);
    }

    #[test]
    fn test_end_command() {
        let mut state = ProgressState::from_payload("/percent indeterminate");
        state.apply("/end");
        assert!(state.ended);
        assert!((state.percent - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percent_is_clamped_and_unknown_commands_ignored() {
        let mut state = ProgressState::default();
        state.apply("/percent 140 /sparkle on");
        assert!((state.percent - 100.0).abs() < f64::EPSILON);
        state = ProgressState::default();
        state.apply("/percent -3");
        assert!((state.percent - 0.0).abs() < f64::EPSILON);
    }
}
