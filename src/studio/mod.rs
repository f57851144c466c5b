pub mod input;
pub mod prompt;
pub mod provider;
pub mod styles;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Emitter};
use ts_rs::TS;

use crate::db::models::GenerationRecord;
use crate::db::repos::history;
use crate::db::DbPool;
use crate::error::AppError;

use provider::PortraitProvider;
use styles::StylePreset;

/// Cosmetic loading phases cycled while a generation is in flight.
/// They carry no semantic weight.
pub const LOADING_PHASES: [&str; 3] = ["捕捉光影轮廓...", "细腻重塑肤质...", "艺术渲染输出..."];

const LOADING_PHASE_INTERVAL: Duration = Duration::from_secs(2);

/// Emitted after every session transition with the full snapshot.
pub const STATE_EVENT: &str = "studio://state";
/// Emitted on each progress-ticker tick while generating.
pub const PROGRESS_EVENT: &str = "studio://progress";

// ============================================================================
// Session state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum StudioStatus {
    Idle,
    Uploading,
    Generating,
    Success,
    Error,
}

/// Full session snapshot sent to the view for re-sync.
///
/// Invariants: `result_image` is present only when status is Success;
/// `error_message` only when status is Error.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StudioSnapshot {
    pub status: StudioStatus,
    pub selected_style: StylePreset,
    pub original_image: Option<String>,
    pub result_image: Option<String>,
    pub error_message: Option<String>,
    pub loading_step: u8,
}

#[derive(Debug, Clone, Serialize)]
struct ProgressPayload {
    step: u8,
    label: &'static str,
}

struct SessionState {
    status: StudioStatus,
    selected_style: &'static StylePreset,
    original_image: Option<String>,
    result_image: Option<String>,
    error_message: Option<String>,
    loading_step: u8,
}

impl SessionState {
    fn new() -> Self {
        Self {
            status: StudioStatus::Idle,
            selected_style: styles::default_preset(),
            original_image: None,
            result_image: None,
            error_message: None,
            loading_step: 0,
        }
    }
}

/// The single-session controller. All state transitions go through its
/// methods; the generation lifecycle is driven by [`generate`].
pub struct Studio {
    session: Mutex<SessionState>,
    /// Exactly one generation may be outstanding. Armed with a
    /// compare-exchange at generation start, cleared when the outcome lands.
    in_flight: AtomicBool,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new()
    }
}

impl Studio {
    pub fn new() -> Self {
        Self {
            session: Mutex::new(SessionState::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> StudioSnapshot {
        let session = self.session.lock().unwrap();
        StudioSnapshot {
            status: session.status,
            selected_style: *session.selected_style,
            original_image: session.original_image.clone(),
            result_image: session.result_image.clone(),
            error_message: session.error_message.clone(),
            loading_step: session.loading_step,
        }
    }

    /// Publish a freshly accepted image as the session's original.
    /// Clears any stale result and error and resets status to idle.
    pub fn accept_image(&self, data_url: String) -> StudioSnapshot {
        {
            let mut session = self.session.lock().unwrap();
            session.original_image = Some(data_url);
            session.result_image = None;
            session.error_message = None;
            session.status = StudioStatus::Idle;
            session.loading_step = 0;
        }
        self.snapshot()
    }

    /// Select a preset from the catalog. Has no effect on the generation
    /// lifecycle; the prompt is resolved when generation starts.
    pub fn select_style(&self, id: &str) -> Result<StudioSnapshot, AppError> {
        let preset = styles::find(id)?;
        self.session.lock().unwrap().selected_style = preset;
        Ok(self.snapshot())
    }

    /// Restore a past generation into the session without re-invoking
    /// the external call.
    pub fn restore_record(&self, record: &GenerationRecord) -> StudioSnapshot {
        {
            let mut session = self.session.lock().unwrap();
            session.original_image = Some(record.original_image.clone());
            session.result_image = Some(record.result_image.clone());
            session.error_message = None;
            session.status = StudioStatus::Success;
            session.loading_step = 0;
        }
        self.snapshot()
    }

    fn advance_loading_step(&self) -> u8 {
        let mut session = self.session.lock().unwrap();
        session.loading_step = next_loading_step(session.loading_step);
        session.loading_step
    }
}

pub(crate) fn next_loading_step(step: u8) -> u8 {
    (step + 1) % LOADING_PHASES.len() as u8
}

pub fn emit_state(app: &AppHandle, snapshot: &StudioSnapshot) {
    let _ = app.emit(STATE_EVENT, snapshot);
}

// ============================================================================
// Generation orchestration
// ============================================================================

/// Run one generation to completion or failure.
///
/// Re-entrant calls while a generation is outstanding are no-ops returning
/// the current snapshot. There is no cancellation and no automatic retry;
/// the session simply reflects the eventual outcome. On success the record
/// is unconditionally prepended to the persisted history.
pub async fn generate(
    studio: Arc<Studio>,
    pool: DbPool,
    provider: Arc<dyn PortraitProvider>,
    app: Option<AppHandle>,
) -> Result<StudioSnapshot, AppError> {
    if studio
        .in_flight
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        tracing::debug!("Generation already in flight, ignoring re-entrant call");
        return Ok(studio.snapshot());
    }

    // Precondition check and transition into Generating under one lock
    let started = {
        let mut session = studio.session.lock().unwrap();
        match session.original_image.clone() {
            None => None,
            Some(original) => {
                session.status = StudioStatus::Generating;
                session.error_message = None;
                session.result_image = None;
                session.loading_step = 0;
                Some((original, session.selected_style))
            }
        }
    };
    let Some((original, style)) = started else {
        studio.in_flight.store(false, Ordering::SeqCst);
        return Err(AppError::Validation("请先上传图片".into()));
    };

    // Resolved at generation start so "random" draws independently each run
    let effective_prompt = styles::resolve_effective_prompt(style);
    tracing::info!(style = %style.name, "Generating portrait");

    if let Some(app) = app.as_ref() {
        emit_state(app, &studio.snapshot());
        arm_progress_ticker(studio.clone(), app.clone());
    }

    let outcome = provider.stylize(&original, effective_prompt).await;

    let snapshot = match outcome {
        Ok(result_image) => {
            let record =
                GenerationRecord::new(original, result_image.clone(), style.name.to_string());
            {
                let mut session = studio.session.lock().unwrap();
                session.status = StudioStatus::Success;
                session.result_image = Some(result_image);
                session.loading_step = 0;
            }
            studio.in_flight.store(false, Ordering::SeqCst);

            if let Err(e) = history::record(&pool, record) {
                tracing::error!(error = %e, "Failed to persist generation history");
            }
            studio.snapshot()
        }
        Err(e) => {
            let message = e.user_message();
            tracing::warn!(error = %e, "Portrait generation failed");
            {
                let mut session = studio.session.lock().unwrap();
                session.status = StudioStatus::Error;
                session.error_message = Some(message);
                session.loading_step = 0;
            }
            studio.in_flight.store(false, Ordering::SeqCst);
            studio.snapshot()
        }
    };

    if let Some(app) = app.as_ref() {
        emit_state(app, &snapshot);
    }
    Ok(snapshot)
}

/// Cycle the cosmetic loading phases while the generation is outstanding.
/// The task observes the in-flight flag and exits on its own, so no periodic
/// work leaks once the outcome lands.
fn arm_progress_ticker(studio: Arc<Studio>, app: AppHandle) {
    tauri::async_runtime::spawn(async move {
        let mut interval = tokio::time::interval(LOADING_PHASE_INTERVAL);
        interval.tick().await; // first tick fires immediately
        loop {
            interval.tick().await;
            if !studio.in_flight.load(Ordering::SeqCst) {
                break;
            }
            let step = studio.advance_loading_step();
            let _ = app.emit(
                PROGRESS_EVENT,
                ProgressPayload {
                    step,
                    label: LOADING_PHASES[step as usize],
                },
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    struct FakeProvider {
        response: Result<String, String>,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl FakeProvider {
        fn ok(result: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(result.into()),
                calls: AtomicUsize::new(0),
                gate: None,
            })
        }

        fn err(message: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Err(message.into()),
                calls: AtomicUsize::new(0),
                gate: None,
            })
        }

        fn gated(result: &str, gate: Arc<Notify>) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(result.into()),
                calls: AtomicUsize::new(0),
                gate: Some(gate),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PortraitProvider for FakeProvider {
        async fn stylize(&self, _original: &str, _prompt: &str) -> Result<String, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.response
                .clone()
                .map_err(AppError::Generation)
        }
    }

    const IMAGE_A: &str = "data:image/png;base64,aW1hZ2VB";
    const IMAGE_B: &str = "data:image/png;base64,aW1hZ2VC";

    #[test]
    fn test_accept_image_resets_session() {
        let studio = Studio::new();

        // Simulate a stale error state first
        {
            let mut session = studio.session.lock().unwrap();
            session.status = StudioStatus::Error;
            session.error_message = Some("old failure".into());
            session.result_image = Some("stale".into());
        }

        let snapshot = studio.accept_image(IMAGE_A.into());
        assert_eq!(snapshot.status, StudioStatus::Idle);
        assert_eq!(snapshot.original_image.as_deref(), Some(IMAGE_A));
        assert!(snapshot.result_image.is_none());
        assert!(snapshot.error_message.is_none());
    }

    #[test]
    fn test_select_style() {
        let studio = Studio::new();
        let snapshot = studio.select_style("01").unwrap();
        assert_eq!(snapshot.selected_style.name, "黑白电影感");
        assert!(matches!(
            studio.select_style("nope"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_restore_record() {
        let studio = Studio::new();
        let record = GenerationRecord::new(IMAGE_A.into(), IMAGE_B.into(), "复古油画光影".into());
        let snapshot = studio.restore_record(&record);
        assert_eq!(snapshot.status, StudioStatus::Success);
        assert_eq!(snapshot.original_image.as_deref(), Some(IMAGE_A));
        assert_eq!(snapshot.result_image.as_deref(), Some(IMAGE_B));
        assert!(snapshot.error_message.is_none());
    }

    #[test]
    fn test_next_loading_step_wraps() {
        assert_eq!(next_loading_step(0), 1);
        assert_eq!(next_loading_step(1), 2);
        assert_eq!(next_loading_step(2), 0);
    }

    #[tokio::test]
    async fn test_generate_success_records_history() {
        let studio = Arc::new(Studio::new());
        let pool = init_test_db().unwrap();
        let provider = FakeProvider::ok(IMAGE_B);

        studio.accept_image(IMAGE_A.into());
        studio.select_style("01").unwrap();

        let snapshot = generate(studio.clone(), pool.clone(), provider.clone(), None)
            .await
            .unwrap();

        assert_eq!(snapshot.status, StudioStatus::Success);
        assert_eq!(snapshot.result_image.as_deref(), Some(IMAGE_B));
        assert!(snapshot.error_message.is_none());
        assert_eq!(provider.call_count(), 1);

        let list = history::load(&pool).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].original_image, IMAGE_A);
        assert_eq!(list[0].result_image, IMAGE_B);
        assert_eq!(list[0].style_name, "黑白电影感");
    }

    #[tokio::test]
    async fn test_generate_failure_sets_error_and_keeps_history() {
        let studio = Arc::new(Studio::new());
        let pool = init_test_db().unwrap();
        let provider = FakeProvider::err("quota exceeded");

        studio.accept_image(IMAGE_A.into());
        let snapshot = generate(studio.clone(), pool.clone(), provider.clone(), None)
            .await
            .unwrap();

        assert_eq!(snapshot.status, StudioStatus::Error);
        assert_eq!(snapshot.error_message.as_deref(), Some("quota exceeded"));
        assert!(snapshot.result_image.is_none());
        assert!(history::load(&pool).unwrap().is_empty());

        // The session stays interactive: a retry is possible
        let retry = generate(studio.clone(), pool, FakeProvider::ok(IMAGE_B), None)
            .await
            .unwrap();
        assert_eq!(retry.status, StudioStatus::Success);
    }

    #[tokio::test]
    async fn test_generate_without_image_is_rejected() {
        let studio = Arc::new(Studio::new());
        let pool = init_test_db().unwrap();
        let provider = FakeProvider::ok(IMAGE_B);

        let err = generate(studio.clone(), pool.clone(), provider.clone(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(provider.call_count(), 0);

        // The in-flight guard was released: a valid call still works
        studio.accept_image(IMAGE_A.into());
        let snapshot = generate(studio, pool, provider, None).await.unwrap();
        assert_eq!(snapshot.status, StudioStatus::Success);
    }

    #[tokio::test]
    async fn test_reentrant_generate_is_a_no_op() {
        let studio = Arc::new(Studio::new());
        let pool = init_test_db().unwrap();
        let gate = Arc::new(Notify::new());
        let provider = FakeProvider::gated(IMAGE_B, gate.clone());

        studio.accept_image(IMAGE_A.into());

        let first = tokio::spawn(generate(
            studio.clone(),
            pool.clone(),
            provider.clone(),
            None,
        ));

        // Wait until the first call has entered Generating
        for _ in 0..100 {
            if studio.snapshot().status == StudioStatus::Generating {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(studio.snapshot().status, StudioStatus::Generating);

        // Second call: no duplicate external call, no state corruption
        let second = generate(studio.clone(), pool, provider.clone(), None)
            .await
            .unwrap();
        assert_eq!(second.status, StudioStatus::Generating);
        assert_eq!(provider.call_count(), 1);

        gate.notify_one();
        let first = first.await.unwrap().unwrap();
        assert_eq!(first.status, StudioStatus::Success);
        assert_eq!(provider.call_count(), 1);
    }
}
