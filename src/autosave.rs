//! Debounced draft saving.
//!
//! Each edit session owns one [`AutoSaver`]. Every edit reschedules the
//! save a fixed delay after the latest edit; at most one timer is pending
//! per session. Cancelling only stops a timer that has not fired yet, so a
//! save already talking to the backend always completes. Save failures are
//! logged and never surfaced.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::api::{ApiClient, ApiError};
use crate::models::submission::{self, SubmissionUpdate};

struct Pending {
    cancel: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

pub struct AutoSaver {
    delay: Duration,
    pending: Option<Pending>,
}

impl AutoSaver {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending save with `save`, to run after the delay.
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&mut self, save: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        self.cancel();

        let (cancel, cancelled) = oneshot::channel::<()>();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                // fires on explicit cancel and when the sender is dropped
                _ = cancelled => return,
            }
            if let Err(e) = save().await {
                log::warn!("auto-save failed: {e}");
            }
        });
        self.pending = Some(Pending { cancel, handle });
    }

    /// Drop the pending timer, if it has not fired yet.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            let _ = pending.cancel.send(());
        }
    }

    /// True while a timer is waiting or its save is still running.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.handle.is_finished())
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// How long a session whose last save has finished is kept, so a later
/// explicit save still sees the `versao` the auto-save produced.
pub const SETTLED_RETENTION: Duration = Duration::from_secs(30 * 60);

type SessionKey = (i64, i64);
type Sessions = Arc<Mutex<HashMap<SessionKey, DraftSession>>>;

/// Draft edit sessions keyed by `(user id, submission id)`. A session is
/// evicted once its last save has finished and [`SETTLED_RETENTION`] has
/// passed without another edit.
#[derive(Clone)]
pub struct DraftSaves {
    delay: Duration,
    sessions: Sessions,
}

struct DraftSession {
    saver: AutoSaver,
    versao: Arc<Mutex<i64>>,
    generation: u64,
    settled_at: Option<Instant>,
}

impl DraftSession {
    fn expired(&self, now: Instant) -> bool {
        self.settled_at
            .is_some_and(|at| now.duration_since(at) >= SETTLED_RETENTION)
    }
}

fn lock(sessions: &Sessions) -> MutexGuard<'_, HashMap<SessionKey, DraftSession>> {
    sessions.lock().unwrap_or_else(|e| e.into_inner())
}

fn sweep(sessions: &mut HashMap<SessionKey, DraftSession>) {
    let now = Instant::now();
    let before = sessions.len();
    sessions.retain(|_, session| !session.expired(now));
    let evicted = before - sessions.len();
    if evicted > 0 {
        log::debug!("evicted {evicted} settled draft sessions");
    }
}

impl DraftSaves {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record an edit and (re)schedule the save. The `versao` sent is the
    /// newest one known when the timer fires: either the caller's or the one
    /// returned by a previous auto-save.
    pub fn record_edit(
        &self,
        api: ApiClient,
        user_id: i64,
        submission_id: i64,
        versao: i64,
        data_json: String,
    ) {
        let key = (user_id, submission_id);
        let mut sessions = lock(&self.sessions);
        sweep(&mut sessions);
        let session = sessions.entry(key).or_insert_with(|| DraftSession {
            saver: AutoSaver::new(self.delay),
            versao: Arc::new(Mutex::new(versao)),
            generation: 0,
            settled_at: None,
        });

        {
            let mut known = session.versao.lock().unwrap_or_else(|e| e.into_inner());
            *known = (*known).max(versao);
        }
        session.generation += 1;
        session.settled_at = None;

        let generation = session.generation;
        let registry = Arc::clone(&self.sessions);
        let versao_slot = Arc::clone(&session.versao);
        session.saver.schedule(move || async move {
            let versao = *versao_slot.lock().unwrap_or_else(|e| e.into_inner());
            let update = SubmissionUpdate { data_json, versao };
            let result = submission::update(&api, submission_id, &update).await;
            if let Ok(Some(saved)) = &result {
                let mut known = versao_slot.lock().unwrap_or_else(|e| e.into_inner());
                *known = (*known).max(saved.versao);
            }
            // a newer edit keeps the session open
            if let Some(session) = lock(&registry).get_mut(&key) {
                if session.generation == generation {
                    session.settled_at = Some(Instant::now());
                }
            }
            result?;
            log::debug!("auto-saved submission {submission_id}");
            Ok(())
        });
    }

    /// Newest `versao` known for a draft session, if one exists.
    pub fn known_versao(&self, user_id: i64, submission_id: i64) -> Option<i64> {
        let mut sessions = lock(&self.sessions);
        sweep(&mut sessions);
        sessions
            .get(&(user_id, submission_id))
            .map(|s| *s.versao.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// End the edit session: a timer that has not fired is cancelled.
    pub fn discard(&self, user_id: i64, submission_id: i64) {
        let mut sessions = lock(&self.sessions);
        if let Some(mut session) = sessions.remove(&(user_id, submission_id)) {
            session.saver.cancel();
        }
    }

    pub fn is_pending(&self, user_id: i64, submission_id: i64) -> bool {
        let sessions = lock(&self.sessions);
        sessions
            .get(&(user_id, submission_id))
            .is_some_and(|s| s.saver.is_pending())
    }

    /// Sessions currently held, after dropping expired ones.
    pub fn session_count(&self) -> usize {
        let mut sessions = lock(&self.sessions);
        sweep(&mut sessions);
        sessions.len()
    }
}
