//! Presentation dispatch loop
//!
//! Owns one notification from presentation to terminal reply: schedules the
//! timeout, applies interactive progress updates in arrival order, maps user
//! actions through the reply protocol and returns the process exit reason.
//! The loop exits on the first closing reply; dropping the loop drops its
//! timer, so no stale timeout can fire after closure (the reply latch guards
//! the same hazard as defense in depth).

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};

use crate::config::PresentationConfig;
use crate::event::Event;
use crate::notification::{AccessoryView, HelpCallToAction, NotificationObject};
use crate::notify::Presenter;
use crate::progress::ProgressState;
use crate::reply::{ExitReason, ReplyHandler, ReplyKind};

/// Far-enough deadline for notifications that wait forever
fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86400 * 365)
}

/// Present one notification and run it to its reply
pub async fn run(
    object: &NotificationObject,
    presenter: &dyn Presenter,
    rx: &mut mpsc::Receiver<Event>,
    defaults: &PresentationConfig,
) -> ExitReason {
    let reply = ReplyHandler::new();

    presenter.present(object);

    let mut progress = match &object.accessory_view {
        Some(AccessoryView::Progressbar { payload }) => {
            Some(ProgressState::from_payload(payload))
        }
        _ => None,
    };
    let has_input = object
        .accessory_view
        .as_ref()
        .is_some_and(AccessoryView::is_input);

    // A timer accessory owns the countdown and fires the main action at
    // zero; otherwise the generic timeout (or the configured default) fires
    // a timeout reply.
    let is_timer = matches!(object.accessory_view, Some(AccessoryView::Timer { .. }));
    let deadline = if is_timer {
        object.timeout.map(|secs| (secs, ReplyKind::Main))
    } else {
        object
            .effective_timeout()
            .or(defaults.default_timeout)
            .map(|secs| (secs, ReplyKind::Timeout))
    };
    let deadline_kind = deadline.map(|(_, kind)| kind);
    let timer = sleep_until(
        deadline.map_or_else(far_future, |(secs, _)| {
            Instant::now() + Duration::from_secs(secs)
        }),
    );
    tokio::pin!(timer);

    loop {
        tokio::select! {
            () = &mut timer, if deadline_kind.is_some() => {
                let kind = deadline_kind.unwrap_or(ReplyKind::Timeout);
                if let Some(exit) = reply.handle_response(kind, None) {
                    return exit;
                }
            }
            event = rx.recv() => {
                let Some(event) = event else {
                    tracing::warn!("Event channel closed before a reply was produced");
                    return ExitReason::UntimelyExit;
                };
                if let Some(exit) = handle_event(event, object, &reply, &mut progress, has_input) {
                    return exit;
                }
            }
        }
    }
}

/// Apply one event; `Some` means a closing reply was emitted
fn handle_event(
    event: Event,
    object: &NotificationObject,
    reply: &ReplyHandler,
    progress: &mut Option<ProgressState>,
    has_input: bool,
) -> Option<ExitReason> {
    match event {
        Event::UserAction { kind, data } => {
            handle_action(kind, data, object, reply, progress.as_ref(), has_input)
        }
        Event::ProgressCommand(commands) => {
            if let Some(state) = progress {
                state.apply(&commands);
                if state.ended {
                    tracing::debug!("Progress bar completed");
                }
            }
            None
        }
        Event::ProgressEnded => {
            if let Some(state) = progress {
                state.complete();
            }
            None
        }
        Event::Interrupt => {
            tracing::info!("Received interrupt, exiting");
            Some(ExitReason::ReceivedSigInt)
        }
        Event::ShowNotification(_) => {
            // One object per pipeline invocation; a second trigger while a
            // surface is active loses the race.
            tracing::warn!("Notification already active, ignoring new trigger");
            None
        }
    }
}

fn handle_action(
    kind: ReplyKind,
    data: Option<String>,
    object: &NotificationObject,
    reply: &ReplyHandler,
    progress: Option<&ProgressState>,
    has_input: bool,
) -> Option<ExitReason> {
    let interruption_allowed = progress.is_some_and(|p| p.user_interruption_allowed);
    let interaction_locked =
        progress.is_some_and(|p| !p.ended && !p.user_interaction_enabled);

    match kind {
        ReplyKind::Main => {
            // While the progress bar grants interruption, the main button is
            // a cancel button.
            let kind = if interruption_allowed {
                ReplyKind::Cancel
            } else {
                ReplyKind::Main
            };
            let data = if has_input { data } else { None };
            reply.handle_response(kind, data)
        }
        ReplyKind::Secondary | ReplyKind::Tertiary => {
            if interaction_locked {
                tracing::debug!(?kind, "Button unavailable while progress bar is running");
                return None;
            }
            reply.handle_response(kind, None)
        }
        ReplyKind::Help => {
            let help = object.help_button.as_ref()?;
            match help.call_to_action {
                HelpCallToAction::InfoPopup => {
                    // Auxiliary info view; the surface stays open and no
                    // terminal reply is generated.
                    tracing::info!("Help info popup opened");
                    None
                }
                HelpCallToAction::Link => {
                    reply.handle_response(ReplyKind::Help, Some(help.payload.clone()))
                }
            }
        }
        ReplyKind::Cancel => {
            if interruption_allowed {
                reply.handle_response(ReplyKind::Cancel, None)
            } else {
                tracing::debug!("Cancel not permitted without an interruptible progress bar");
                None
            }
        }
        ReplyKind::Timeout => {
            // The dispatch loop owns the timeout timer; a synthetic timeout
            // action from outside is not honored.
            tracing::debug!("Ignoring external timeout action");
            None
        }
    }
}
