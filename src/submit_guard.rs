// In-flight guard for form submissions.
//
// A submission is keyed by its form and a natural key (the phone number for
// registrations, user + game for score overrides). While one is in flight a
// second identical submission is rejected instead of being sent again.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::metrics;

/// Forms that go through the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitKind {
    Register,
    ForceScore,
}

impl SubmitKind {
    fn label(&self) -> &'static str {
        match self {
            SubmitKind::Register => "register",
            SubmitKind::ForceScore => "force_score",
        }
    }
}

impl std::fmt::Display for SubmitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitKind::Register => write!(f, "사용자 등록"),
            SubmitKind::ForceScore => write!(f, "기록 수정"),
        }
    }
}

/// Error returned when the same submission is already in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSubmission {
    pub kind: SubmitKind,
}

impl std::fmt::Display for DuplicateSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "같은 {} 요청이 이미 처리 중입니다.", self.kind)
    }
}

type SubmitKey = (SubmitKind, String);

/// Thread-safe set of in-flight submissions.
#[derive(Debug, Clone, Default)]
pub struct SubmitGuard {
    inner: Arc<Mutex<HashSet<SubmitKey>>>,
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a submission as in flight. The returned permit releases the key
    /// when dropped.
    pub fn acquire(&self, kind: SubmitKind, key: &str) -> Result<SubmitPermit, DuplicateSubmission> {
        let entry = (kind, key.to_string());
        if !self.lock().insert(entry.clone()) {
            metrics::DUPLICATE_SUBMISSIONS_TOTAL
                .with_label_values(&[kind.label()])
                .inc();
            tracing::info!(%kind, key, "rejected duplicate submission");
            return Err(DuplicateSubmission { kind });
        }
        Ok(SubmitPermit {
            guard: self.clone(),
            key: Some(entry),
        })
    }

    /// Number of submissions currently in flight (for tests/diagnostics).
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<SubmitKey>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Held for the duration of one submission.
#[derive(Debug)]
pub struct SubmitPermit {
    guard: SubmitGuard,
    key: Option<SubmitKey>,
}

impl Drop for SubmitPermit {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.guard.lock().remove(&key);
        }
    }
}
