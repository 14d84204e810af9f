//! Application events
//!
//! The router, the parsers and the presentation layer converge on one tokio
//! mpsc channel of `Event`s consumed by the dispatch loop. User actions and
//! interactive progress-bar commands arrive as newline-delimited lines on
//! stdin: lines starting with `/` are progress commands, bare words are user
//! actions (optionally followed by input-field data).

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::notification::NotificationObject;
use crate::reply::ReplyKind;

/// Events flowing through the agent
#[derive(Debug)]
pub enum Event {
    /// A trigger produced a validated notification to present (boxed to
    /// reduce enum size)
    ShowNotification(Box<NotificationObject>),
    /// The user acted on the presented surface
    UserAction {
        kind: ReplyKind,
        /// Input-field value, when an input accessory is active
        data: Option<String>,
    },
    /// Interactive progress-bar command line (e.g. `/percent 40`)
    ProgressCommand(String),
    /// The interactive update stream ended (`/end` or EOF)
    ProgressEnded,
    /// SIGINT received
    Interrupt,
}

/// Parse one stdin line into an event
///
/// Returns `None` for blank or unrecognized lines; they are skipped, not
/// errors. State updates must be applied in arrival order, which the single
/// reader task guarantees.
pub fn parse_line(line: &str) -> Option<Event> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line == "/end" {
        return Some(Event::ProgressEnded);
    }
    if line.starts_with('/') {
        return Some(Event::ProgressCommand(line.to_string()));
    }

    let (word, rest) = match line.split_once(' ') {
        Some((word, rest)) => (word, Some(rest.trim().to_string())),
        None => (line, None),
    };
    let kind = word.parse::<ReplyKind>().ok()?;
    Some(Event::UserAction { kind, data: rest })
}

/// Read user actions and progress commands from stdin until EOF, `/end` or
/// cancellation
pub async fn listen_stdin(tx: tokio::sync::mpsc::Sender<Event>, cancel: CancellationToken) {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        let Some(event) = parse_line(&line) else { continue };
                        // `/end` only finishes the progress stream; user
                        // actions keep flowing until EOF or cancellation.
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        // EOF: the interactive stream is over
                        let _ = tx.send(Event::ProgressEnded).await;
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed reading stdin");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_action() {
        match parse_line("main").unwrap() {
            Event::UserAction { kind, data } => {
                assert_eq!(kind, ReplyKind::Main);
                assert!(data.is_none());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_parse_user_action_with_data() {
        match parse_line("main jane.doe@example.com").unwrap() {
            Event::UserAction { kind, data } => {
                assert_eq!(kind, ReplyKind::Main);
                assert_eq!(data.as_deref(), Some("jane.doe@example.com"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_parse_progress_command() {
        match parse_line("/percent 40 /top_message Copying").unwrap() {
            Event::ProgressCommand(cmd) => {
                assert_eq!(cmd, "/percent 40 /top_message Copying");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_parse_end_marker() {
        assert!(matches!(parse_line("/end").unwrap(), Event::ProgressEnded));
    }

    #[test]
    fn test_blank_and_unknown_lines_are_skipped() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   ").is_none());
        assert!(parse_line("frobnicate").is_none());
    }
}
