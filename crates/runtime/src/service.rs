//! Async suggestion service.
//!
//! [`SuggestionService`] wires the pure [`Advisor`] to its collaborators:
//! the catalog provider, the repositories and the suggestion cache. Per
//! character, record updates run as one load -> transition -> persist cycle
//! under a lock, and a request overtaken by a newer one for the same
//! character computes its answer but commits nothing.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use advisor_core::{
    AdviseOptions, Advisor, AnchorPair, AnchorResult, AnchorTransition, Archetype, CandidateOption,
    CharacterId, CharacterSnapshot, CharacterState, Diagnostic, EvaluationError, ExplainContext,
    FocusTable, HistoryEntry, IdentityView, OpportunityCost, PivotResult, PivotState, Suggestion,
    ThemeTable, sort_suggestions,
};
use tracing::{debug, info, warn};

use crate::api::{
    CatalogProvider, CharacterStateProvider, ResponseSource, Result, RuntimeError,
    StaticCatalogProvider, SuggestionRequest, SuggestionResponse,
};
use crate::cache::{CacheKey, SuggestionCache};
use crate::config::RuntimeConfig;
use crate::locks::CharacterLocks;
use crate::repository::{
    AdviceRecord, AdviceRepository, AdvisorRepository, HistoryRepository, IdentityRepository,
    InMemoryRepository, LastShown,
};

/// Everything persisted for one character.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CharacterRecords {
    pub history: Vec<HistoryEntry>,
    pub anchors: AnchorPair,
    pub pivot: PivotState,
}

pub struct SuggestionService {
    advisor: Arc<Advisor>,
    catalog: Arc<dyn CatalogProvider>,
    repository: Arc<dyn AdvisorRepository>,
    cache: SuggestionCache,
    locks: CharacterLocks,
    config: RuntimeConfig,
}

impl SuggestionService {
    pub fn builder() -> SuggestionServiceBuilder {
        SuggestionServiceBuilder::new()
    }

    pub fn advisor(&self) -> &Advisor {
        &self.advisor
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn cache(&self) -> &SuggestionCache {
        &self.cache
    }

    /// Ranked, explained suggestions for one request.
    ///
    /// Never fails: every degraded path is reported in
    /// [`SuggestionResponse::diagnostics`].
    pub async fn get_suggestions(
        &self,
        state: &CharacterState,
        request: &SuggestionRequest,
    ) -> SuggestionResponse {
        let (state, mut diagnostics) = state.sanitized();
        for diagnostic in &diagnostics {
            warn!(character = %state.id, kind = %diagnostic.kind, "{}", diagnostic.message);
        }

        let focus = request
            .focus
            .clone()
            .unwrap_or_else(|| self.config.default_focus.clone());
        let snapshot_hash = CharacterSnapshot::build(&state, &focus, &request.pending).hash();
        let key = CacheKey::for_request(state.id.clone(), request);
        let ticket = self.locks.ticket(&state.id);

        if let Some(advice) = self.cache.get(&key, &snapshot_hash) {
            debug!(character = %state.id, hash = %snapshot_hash, "suggestion cache hit");
            return SuggestionResponse::from_advice(advice, snapshot_hash, ResponseSource::Cached);
        }

        let Some((candidates, unavailable)) =
            self.fetch_candidates(&state.id, request, &mut diagnostics).await
        else {
            return self.degraded(&key, snapshot_hash, diagnostics);
        };

        let _guard = ticket.lock().await;

        let digest = request.step.as_ref().map(|step| {
            let ids = candidates
                .iter()
                .map(|c| c.id.as_str())
                .chain(unavailable.iter().map(String::as_str));
            AdviceRecord::digest(step, &snapshot_hash, ids, &request.context)
        });
        if let (Some(step), Some(digest)) = (&request.step, &digest) {
            let id = state.id.clone();
            let step_key = step.clone();
            match self
                .persist("load advice", move |repo| repo.load_advice(&id, &step_key))
                .await
            {
                Ok(Some(record)) if record.input_digest == *digest => {
                    debug!(character = %state.id, step = %step, "replaying advice for unchanged step");
                    return SuggestionResponse {
                        suggestions: record.suggestions,
                        future: record.future,
                        snapshot_hash,
                        source: ResponseSource::Replayed,
                        diagnostics,
                    };
                }
                Ok(_) => {}
                Err(err) => diagnostics.push(self.persistence_failure(&state.id, &err)),
            }
        }

        let (mut records, loaded) = match self.load_records(&state.id).await {
            Ok(records) => (records, true),
            Err(err) => {
                let diagnostic = self.persistence_failure(&state.id, &err);
                if let Some(mut advice) = self.cache.last_known_good(&key) {
                    info!(character = %state.id, "serving last-known-good suggestions");
                    advice.diagnostics.push(diagnostic);
                    return SuggestionResponse::from_advice(
                        advice,
                        snapshot_hash,
                        ResponseSource::LastKnownGood,
                    );
                }
                diagnostics.push(diagnostic);
                (CharacterRecords::default(), false)
            }
        };

        let now = unix_now();
        let engine = self.advisor.config();
        let themes = self.advisor.themes();
        let anchor_result = records.anchors.update(
            &records.history,
            themes,
            engine.anchor_window,
            state.level,
            now,
        );
        let pivot_transition = records.pivot.update(
            &records.anchors.primary,
            &records.history,
            themes,
            engine.pivot_window,
            state.level,
        );
        log_transitions(&state.id, &anchor_result, pivot_transition.as_ref());

        let identity = IdentityView {
            anchors: &records.anchors,
            pivot: &records.pivot,
        };
        let mut advice = self.advisor.advise(
            &candidates,
            &state,
            &request.pending,
            identity,
            &AdviseOptions {
                focus: focus.clone(),
                include_unqualified: request.include_unqualified,
            },
        );
        if !unavailable.is_empty() {
            let profile = self.advisor.focus_table().resolve(&focus);
            advice.suggestions.extend(unavailable.iter().map(|id| {
                self.advisor.finish(
                    Suggestion::fallback(id.as_str()),
                    OpportunityCost::none(),
                    &state,
                    identity,
                    &profile,
                )
            }));
            sort_suggestions(&mut advice.suggestions);
        }
        diagnostics.append(&mut advice.diagnostics);

        if ticket.is_current() {
            self.commit(&state.id, &records, loaded, &mut diagnostics).await;
            if let (Some(step), Some(digest)) = (&request.step, digest) {
                let record = AdviceRecord {
                    step: step.clone(),
                    input_digest: digest,
                    suggestions: advice.suggestions.clone(),
                    future: advice.future.clone(),
                    created_at: now,
                };
                let id = state.id.clone();
                if let Err(err) = self
                    .persist("save advice", move |repo| repo.save_advice(&id, &record))
                    .await
                {
                    diagnostics.push(self.persistence_failure(&state.id, &err));
                }
            }
            let shown = LastShown {
                context: request.context.clone(),
                ids: advice.suggestions.iter().map(|s| s.id.clone()).collect(),
                shown_at: now,
            };
            let id = state.id.clone();
            if let Err(err) = self
                .persist("save last shown", move |repo| repo.save_last_shown(&id, &shown))
                .await
            {
                diagnostics.push(self.persistence_failure(&state.id, &err));
            }
        } else {
            debug!(
                character = %state.id,
                generation = ticket.generation(),
                "request overtaken by a newer one; discarding state writes"
            );
        }

        advice.diagnostics = diagnostics;
        if loaded && ticket.is_current() {
            self.cache
                .insert(key, snapshot_hash.clone(), advice.clone());
        }

        info!(
            character = %state.id,
            suggestions = advice.suggestions.len(),
            diagnostics = advice.diagnostics.len(),
            "suggestions computed"
        );
        SuggestionResponse::from_advice(advice, snapshot_hash, ResponseSource::Computed)
    }

    /// Fetches the character from `provider`, then runs [`Self::get_suggestions`].
    /// An unavailable state degrades to a level-1 default character.
    pub async fn suggestions_for(
        &self,
        provider: &dyn CharacterStateProvider,
        character: &CharacterId,
        request: &SuggestionRequest,
    ) -> SuggestionResponse {
        match provider.character_state(character).await {
            Ok(state) => self.get_suggestions(&state, request).await,
            Err(err) => {
                warn!(character = %character, error = %err, "character state unavailable; using defaults");
                let mut response = self
                    .get_suggestions(&CharacterState::new(character.as_str(), 1), request)
                    .await;
                response
                    .diagnostics
                    .insert(0, err.to_diagnostic().for_character(character.clone()));
                response
            }
        }
    }

    /// Re-runs anchor detection against the stored history and persists
    /// the result.
    pub async fn update_anchor(&self, state: &CharacterState) -> Result<AnchorResult> {
        let ticket = self.locks.ticket(&state.id);
        let _guard = ticket.lock().await;

        let mut records = self.load_records(&state.id).await?;
        let result = records.anchors.update(
            &records.history,
            self.advisor.themes(),
            self.advisor.config().anchor_window,
            state.level,
            unix_now(),
        );
        log_transitions(&state.id, &result, None);
        self.save_anchors(&state.id, &records.anchors).await?;
        Ok(result)
    }

    /// Locks the proposed primary anchor, optionally to another archetype.
    pub async fn confirm_anchor(
        &self,
        state: &CharacterState,
        archetype: &Archetype,
    ) -> Result<AnchorTransition> {
        let ticket = self.locks.ticket(&state.id);
        let _guard = ticket.lock().await;

        let mut anchors = self.load_anchors(&state.id).await?;
        let transition =
            anchors
                .primary
                .confirm(archetype, self.advisor.themes(), state.level, unix_now())?;
        self.save_anchors(&state.id, &anchors).await?;
        info!(character = %state.id, %archetype, "anchor confirmed");
        Ok(transition)
    }

    /// Declines the proposed primary anchor.
    pub async fn reject_anchor(&self, state: &CharacterState) -> Result<AnchorTransition> {
        let ticket = self.locks.ticket(&state.id);
        let _guard = ticket.lock().await;

        let mut anchors = self.load_anchors(&state.id).await?;
        let transition = anchors.primary.reject(state.level, unix_now())?;
        self.save_anchors(&state.id, &anchors).await?;
        info!(character = %state.id, "anchor proposal rejected");
        Ok(transition)
    }

    /// Recomputes divergence against the stored anchor and history.
    pub async fn update_pivot(&self, state: &CharacterState) -> Result<PivotResult> {
        let ticket = self.locks.ticket(&state.id);
        let _guard = ticket.lock().await;

        let mut records = self.load_records(&state.id).await?;
        let transition = records.pivot.update(
            &records.anchors.primary,
            &records.history,
            self.advisor.themes(),
            self.advisor.config().pivot_window,
            state.level,
        );
        if let Some(transition) = &transition {
            info!(character = %state.id, from = ?transition.from, to = ?transition.to, "pivot transition");
        }

        let id = state.id.clone();
        let pivot = records.pivot.clone();
        self.persist("save pivot", move |repo| repo.save_pivot(&id, &pivot))
            .await?;
        self.cache.invalidate(&state.id);
        Ok(PivotResult {
            state: records.pivot,
            transition,
        })
    }

    /// Appends a choice to the history log. Best-effort: a failure is
    /// logged and returned as a diagnostic.
    pub async fn record_choice(&self, character: &CharacterId, entry: HistoryEntry) -> Option<Diagnostic> {
        let ticket = self.locks.ticket(character);
        let _guard = ticket.lock().await;

        let id = character.clone();
        let result = self
            .persist("append history", move |repo| repo.append(&id, &entry))
            .await;
        self.cache.invalidate(character);
        match result {
            Ok(()) => {
                debug!(character = %character, "choice recorded");
                None
            }
            Err(err) => Some(self.persistence_failure(character, &err)),
        }
    }

    /// Opportunity cost of one candidate against the stored anchor.
    pub async fn compute_opportunity_cost(
        &self,
        candidate: &CandidateOption,
        state: &CharacterState,
    ) -> Result<OpportunityCost> {
        let (state, _) = state.sanitized();
        let anchors = self.load_anchors(&state.id).await?;
        Ok(self.advisor.analyzer().compute(candidate, &state, &anchors.primary))
    }

    /// Explanation of `suggestion` against the stored identity records.
    pub async fn explain(
        &self,
        suggestion: &Suggestion,
        state: &CharacterState,
        cost_reasons: &[String],
    ) -> Result<String> {
        let (state, _) = state.sanitized();
        let records = self.load_records(&state.id).await?;
        Ok(self.advisor.explainer().explain(
            suggestion,
            &state,
            &ExplainContext {
                anchor: &records.anchors.primary,
                pivot: &records.pivot,
                themes: self.advisor.themes(),
            },
            cost_reasons,
        ))
    }

    /// Stored history, anchors and pivot of one character.
    pub async fn records(&self, character: &CharacterId) -> Result<CharacterRecords> {
        self.load_records(character).await
    }

    /// Suggestion ids last presented to the character in `context`.
    pub async fn last_shown(&self, character: &CharacterId, context: &str) -> Result<Option<LastShown>> {
        let id = character.clone();
        let context = context.to_string();
        self.persist("load last shown", move |repo| repo.load_last_shown(&id, &context))
            .await
    }

    async fn fetch_candidates(
        &self,
        character: &CharacterId,
        request: &SuggestionRequest,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<(Vec<CandidateOption>, Vec<String>)> {
        if request.candidate_ids.is_empty() {
            return match self.catalog.candidates(&request.domain).await {
                Ok(candidates) => Some((candidates, Vec::new())),
                Err(err) => {
                    warn!(character = %character, error = %err, "catalog unavailable");
                    diagnostics.push(err.to_diagnostic().for_character(character.clone()));
                    None
                }
            };
        }

        let mut candidates = Vec::with_capacity(request.candidate_ids.len());
        let mut unavailable = Vec::new();
        for id in &request.candidate_ids {
            match self.catalog.lookup(id).await {
                Ok(Some(candidate)) => candidates.push(candidate),
                Ok(None) => {
                    warn!(character = %character, candidate = %id, "candidate definition missing");
                    diagnostics.push(
                        EvaluationError::DefinitionUnavailable(id.clone())
                            .to_diagnostic()
                            .for_character(character.clone()),
                    );
                    unavailable.push(id.clone());
                }
                Err(err) => {
                    warn!(character = %character, candidate = %id, error = %err, "candidate lookup failed");
                    diagnostics.push(
                        err.to_diagnostic()
                            .for_character(character.clone())
                            .for_candidate(id.as_str()),
                    );
                    unavailable.push(id.clone());
                }
            }
        }
        Some((candidates, unavailable))
    }

    fn degraded(
        &self,
        key: &CacheKey,
        snapshot_hash: String,
        diagnostics: Vec<Diagnostic>,
    ) -> SuggestionResponse {
        match self.cache.last_known_good(key) {
            Some(mut advice) => {
                advice.diagnostics.extend(diagnostics);
                SuggestionResponse::from_advice(advice, snapshot_hash, ResponseSource::LastKnownGood)
            }
            None => SuggestionResponse {
                suggestions: Vec::new(),
                future: Vec::new(),
                snapshot_hash,
                source: ResponseSource::Computed,
                diagnostics,
            },
        }
    }

    async fn commit(
        &self,
        character: &CharacterId,
        records: &CharacterRecords,
        loaded: bool,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        // Records built from defaults after a failed load must not
        // overwrite what is stored.
        if !self.config.persist_state || !loaded {
            return;
        }
        let id = character.clone();
        let anchors = records.anchors.clone();
        let pivot = records.pivot.clone();
        let result = self
            .persist("save identity", move |repo| {
                repo.save_anchors(&id, &anchors)?;
                repo.save_pivot(&id, &pivot)
            })
            .await;
        if let Err(err) = result {
            diagnostics.push(self.persistence_failure(character, &err));
        }
    }

    async fn load_records(&self, character: &CharacterId) -> Result<CharacterRecords> {
        let id = character.clone();
        self.persist("load records", move |repo| {
            Ok(CharacterRecords {
                history: repo.load(&id)?,
                anchors: repo.load_anchors(&id)?.unwrap_or_default(),
                pivot: repo.load_pivot(&id)?.unwrap_or_default(),
            })
        })
        .await
    }

    async fn load_anchors(&self, character: &CharacterId) -> Result<AnchorPair> {
        let id = character.clone();
        self.persist("load anchors", move |repo| {
            Ok(repo.load_anchors(&id)?.unwrap_or_default())
        })
        .await
    }

    async fn save_anchors(&self, character: &CharacterId, anchors: &AnchorPair) -> Result<()> {
        let id = character.clone();
        let anchors = anchors.clone();
        self.persist("save anchors", move |repo| repo.save_anchors(&id, &anchors))
            .await?;
        self.cache.invalidate(character);
        Ok(())
    }

    /// Runs a repository call on the blocking pool, bounded by the
    /// configured persistence timeout. A timed-out call may still complete
    /// in the background.
    async fn persist<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn AdvisorRepository) -> crate::repository::Result<T> + Send + 'static,
    {
        let repository = Arc::clone(&self.repository);
        let task = tokio::task::spawn_blocking(move || f(repository.as_ref()));
        match tokio::time::timeout(self.config.persistence_timeout, task).await {
            Ok(Ok(result)) => result.map_err(RuntimeError::from),
            Ok(Err(join)) => Err(RuntimeError::WorkerJoin(join)),
            Err(_) => Err(RuntimeError::PersistenceTimeout {
                operation,
                timeout_ms: u64::try_from(self.config.persistence_timeout.as_millis())
                    .unwrap_or(u64::MAX),
            }),
        }
    }

    fn persistence_failure(&self, character: &CharacterId, err: &RuntimeError) -> Diagnostic {
        warn!(character = %character, error = %err, "persistence failure");
        err.to_diagnostic().for_character(character.clone())
    }
}

fn log_transitions(
    character: &CharacterId,
    anchors: &AnchorResult,
    pivot: Option<&advisor_core::PivotTransition>,
) {
    if let Some(t) = &anchors.primary_transition {
        info!(character = %character, from = %t.from, to = %t.to, "primary anchor transition");
    }
    if let Some(t) = &anchors.secondary_transition {
        debug!(character = %character, from = %t.from, to = %t.to, "secondary anchor transition");
    }
    if let Some(t) = pivot {
        info!(
            character = %character,
            from = ?t.from,
            to = ?t.to,
            divergence = t.divergence,
            "pivot transition"
        );
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Builder for [`SuggestionService`].
pub struct SuggestionServiceBuilder {
    config: RuntimeConfig,
    themes: ThemeTable,
    focus: FocusTable,
    catalog: Option<Arc<dyn CatalogProvider>>,
    repository: Option<Arc<dyn AdvisorRepository>>,
}

impl SuggestionServiceBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            themes: ThemeTable::default(),
            focus: FocusTable::default(),
            catalog: None,
            repository: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn themes(mut self, themes: ThemeTable) -> Self {
        self.themes = themes;
        self
    }

    pub fn focus(mut self, focus: FocusTable) -> Self {
        self.focus = focus;
        self
    }

    pub fn catalog(mut self, catalog: impl CatalogProvider + 'static) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    pub fn repository(mut self, repository: impl AdvisorRepository + 'static) -> Self {
        self.repository = Some(Arc::new(repository));
        self
    }

    /// Share a repository with other owners (tests, the host).
    pub fn shared_repository(mut self, repository: Arc<dyn AdvisorRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Missing collaborators default to an empty catalog and an in-memory
    /// repository.
    pub fn build(self) -> SuggestionService {
        let advisor = Advisor::new(self.config.engine.clone(), self.themes, self.focus);
        SuggestionService {
            advisor: Arc::new(advisor),
            catalog: self
                .catalog
                .unwrap_or_else(|| Arc::new(StaticCatalogProvider::new(Vec::new()))),
            repository: self
                .repository
                .unwrap_or_else(|| Arc::new(InMemoryRepository::new())),
            cache: SuggestionCache::new(),
            locks: CharacterLocks::default(),
            config: self.config,
        }
    }
}
