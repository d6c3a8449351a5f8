//! Transient toast notifications.
//!
//! Each notice becomes visible shortly after it is raised, stays for a fixed
//! lifetime, then plays a short exit before it is dropped. Notices stack in
//! the order they were raised; there is no cap.

use std::time::{Duration, Instant};

use tracing::{info, warn};

pub const SHOW_DELAY: Duration = Duration::from_millis(50);
pub const LIFETIME: Duration = Duration::from_secs(3);
pub const EXIT_DURATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

impl NoticeKind {
    pub fn label(self) -> &'static str {
        match self {
            NoticeKind::Info => "INFO",
            NoticeKind::Success => "OK",
            NoticeKind::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticePhase {
    /// Raised but not yet shown.
    Pending,
    Visible,
    Leaving,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub kind: NoticeKind,
    pub raised_at: Instant,
}

impl Notice {
    /// Phase at `now`, or `None` once the exit has finished.
    pub fn phase(&self, now: Instant) -> Option<NoticePhase> {
        let age = now.saturating_duration_since(self.raised_at);
        if age < SHOW_DELAY {
            Some(NoticePhase::Pending)
        } else if age < SHOW_DELAY + LIFETIME {
            Some(NoticePhase::Visible)
        } else if age < SHOW_DELAY + LIFETIME + EXIT_DURATION {
            Some(NoticePhase::Leaving)
        } else {
            None
        }
    }
}

#[derive(Debug, Default)]
pub struct NotificationCenter {
    notices: Vec<Notice>,
    next_id: u64,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NoticeKind, now: Instant) -> u64 {
        let message = message.into();
        match kind {
            NoticeKind::Error => warn!(notice = %message, "error notice"),
            NoticeKind::Info | NoticeKind::Success => {
                info!(notice = %message, kind = kind.label(), "notice")
            }
        }

        self.next_id += 1;
        self.notices.push(Notice {
            id: self.next_id,
            message,
            kind,
            raised_at: now,
        });
        self.next_id
    }

    /// Drop notices whose exit has finished.
    pub fn tick(&mut self, now: Instant) {
        self.notices.retain(|n| n.phase(now).is_some());
    }

    /// Notices that should be drawn, oldest first, with their phase.
    pub fn shown(&self, now: Instant) -> impl Iterator<Item = (&Notice, NoticePhase)> {
        self.notices.iter().filter_map(move |n| match n.phase(now) {
            Some(NoticePhase::Pending) | None => None,
            Some(phase) => Some((n, phase)),
        })
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_phases() {
        let t0 = Instant::now();
        let mut center = NotificationCenter::new();
        center.notify("saved", NoticeKind::Success, t0);

        assert_eq!(center.shown(t0).count(), 0);
        assert_eq!(center.shown(t0 + Duration::from_millis(50)).count(), 1);

        let leaving = t0 + SHOW_DELAY + LIFETIME + Duration::from_millis(10);
        let (_, phase) = center.shown(leaving).next().unwrap();
        assert_eq!(phase, NoticePhase::Leaving);

        center.tick(t0 + SHOW_DELAY + LIFETIME + EXIT_DURATION);
        assert!(center.is_empty());
    }

    #[test]
    fn notices_stack_without_limit() {
        let t0 = Instant::now();
        let mut center = NotificationCenter::new();
        for i in 0..25 {
            center.notify(format!("n{i}"), NoticeKind::Info, t0);
        }
        center.tick(t0 + Duration::from_secs(1));
        assert_eq!(center.len(), 25);
        let first = center.shown(t0 + Duration::from_secs(1)).next().unwrap().0;
        assert_eq!(first.message, "n0");
    }

    #[test]
    fn ids_are_unique() {
        let t0 = Instant::now();
        let mut center = NotificationCenter::new();
        let a = center.notify("a", NoticeKind::Info, t0);
        let b = center.notify("b", NoticeKind::Error, t0);
        assert_ne!(a, b);
        assert_eq!(center.latest().unwrap().kind, NoticeKind::Error);
    }
}
