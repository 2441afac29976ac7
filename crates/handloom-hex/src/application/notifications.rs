use chrono::{DateTime, Utc};
use handloom_types::domain::notification::{Toast, ToastKind};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct ToastOptions {
    pub kind: ToastKind,
    /// Overrides the notifier's default lifetime.
    pub duration: Option<Duration>,
    pub persist: bool,
}

impl ToastOptions {
    pub fn success() -> Self {
        Self {
            kind: ToastKind::Success,
            ..Self::default()
        }
    }

    pub fn error() -> Self {
        Self {
            kind: ToastKind::Error,
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn persistent(mut self) -> Self {
        self.persist = true;
        self
    }
}

#[derive(Debug, Default)]
struct NotifierState {
    next_id: u64,
    toasts: Vec<Toast>,
}

/// Toast queue for one session. Ids come from this instance's own counter.
#[derive(Debug)]
pub struct Notifier {
    default_duration: Duration,
    state: Mutex<NotifierState>,
}

impl Notifier {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            default_duration,
            state: Mutex::new(NotifierState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, NotifierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn show(&self, message: impl Into<String>, opts: ToastOptions) -> u64 {
        self.show_at(message, opts, Utc::now())
    }

    pub fn show_at(&self, message: impl Into<String>, opts: ToastOptions, now: DateTime<Utc>) -> u64 {
        let lifetime = opts.duration.unwrap_or(self.default_duration);
        // An unrepresentable lifetime behaves like `persist`.
        let expires_at = if opts.persist {
            None
        } else {
            chrono::Duration::from_std(lifetime)
                .ok()
                .and_then(|d| now.checked_add_signed(d))
        };

        let mut state = self.state();
        state.toasts.retain(|t| !t.is_expired(now));
        state.next_id += 1;
        let id = state.next_id;
        let toast = Toast {
            id,
            message: message.into(),
            kind: opts.kind,
            created_at: now,
            expires_at,
        };
        tracing::debug!(id, kind = ?toast.kind, message = %toast.message, "toast");
        state.toasts.push(toast);
        id
    }

    /// Toasts still showing, oldest first. Expired ones are dropped.
    pub fn active(&self) -> Vec<Toast> {
        self.active_at(Utc::now())
    }

    pub fn active_at(&self, now: DateTime<Utc>) -> Vec<Toast> {
        let mut state = self.state();
        state.toasts.retain(|t| !t.is_expired(now));
        state.toasts.clone()
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let mut state = self.state();
        let before = state.toasts.len();
        state.toasts.retain(|t| t.id != id);
        state.toasts.len() != before
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Duration::from_millis(3000))
    }
}
