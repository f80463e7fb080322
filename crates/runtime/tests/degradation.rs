mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use advisor_core::{CandidateOption, CharacterId, ErrorKind, HistoryEntry, PendingSelections};
use advisor_runtime::{
    CatalogProvider, ResponseSource, RuntimeConfig, RuntimeError, StaticCatalogProvider,
    SuggestionRequest, SuggestionService,
};
use async_trait::async_trait;
use common::{TestRepository, catalog, trooper};

/// Catalog that can be taken offline mid-test.
struct FlakyCatalog {
    inner: StaticCatalogProvider,
    down: Arc<AtomicBool>,
}

impl FlakyCatalog {
    fn new(down: bool) -> (Self, Arc<AtomicBool>) {
        let switch = Arc::new(AtomicBool::new(down));
        let catalog = Self {
            inner: catalog(),
            down: Arc::clone(&switch),
        };
        (catalog, switch)
    }

    fn check(&self) -> Result<(), RuntimeError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(RuntimeError::CatalogUnavailable("content server offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogProvider for FlakyCatalog {
    async fn candidates(&self, domain: &str) -> Result<Vec<CandidateOption>, RuntimeError> {
        self.check()?;
        self.inner.candidates(domain).await
    }

    async fn lookup(&self, id: &str) -> Result<Option<CandidateOption>, RuntimeError> {
        self.check()?;
        self.inner.lookup(id).await
    }
}

fn service(repo: &Arc<TestRepository>) -> SuggestionService {
    SuggestionService::builder()
        .catalog(catalog())
        .shared_repository(repo.clone())
        .build()
}

fn has_kind(diagnostics: &[advisor_core::Diagnostic], kind: ErrorKind) -> bool {
    diagnostics.iter().any(|d| d.kind == kind)
}

#[tokio::test]
async fn failed_load_serves_last_known_good() {
    let repo = Arc::new(TestRepository::default());
    let service = service(&repo);
    let request = SuggestionRequest::new("level_up", "feat");

    let healthy = service.get_suggestions(&trooper(6), &request).await;
    assert_eq!(healthy.source, ResponseSource::Computed);

    // A new pending selection changes the hash, forcing a recompute.
    repo.fail(true);
    let degraded = service
        .get_suggestions(
            &trooper(6),
            &request
                .clone()
                .with_pending(PendingSelections::new(["cleave"])),
        )
        .await;

    assert_eq!(degraded.source, ResponseSource::LastKnownGood);
    assert_eq!(degraded.suggestions, healthy.suggestions);
    let last = degraded.diagnostics.last().expect("failure reported");
    assert_eq!(last.kind, ErrorKind::PersistenceFailure);
    assert_eq!(last.character_id, Some(CharacterId::new("pc")));
}

#[tokio::test]
async fn failed_load_without_history_uses_defaults() {
    let repo = Arc::new(TestRepository::default());
    repo.fail(true);
    let service = service(&repo);

    let response = service
        .get_suggestions(&trooper(6), &SuggestionRequest::new("level_up", "feat"))
        .await;

    assert_eq!(response.source, ResponseSource::Computed);
    assert!(!response.suggestions.is_empty());
    assert!(has_kind(&response.diagnostics, ErrorKind::PersistenceFailure));
    assert!(service.cache().is_empty(), "defaults are never cached");
    assert_eq!(repo.anchor_saves(), 0, "defaults are never persisted");
}

#[tokio::test]
async fn slow_repository_times_out_but_still_advises() {
    let repo = Arc::new(TestRepository::default());
    repo.set_delay(Duration::from_millis(200));
    let service = SuggestionService::builder()
        .config(RuntimeConfig::default().with_persistence_timeout(Duration::from_millis(20)))
        .catalog(catalog())
        .shared_repository(repo.clone())
        .build();

    let response = service
        .get_suggestions(&trooper(6), &SuggestionRequest::new("level_up", "feat"))
        .await;

    assert_eq!(response.source, ResponseSource::Computed);
    assert_eq!(response.suggestions[0].id, "armor_mastery");
    let timeout = response
        .diagnostics
        .iter()
        .find(|d| d.kind == ErrorKind::PersistenceFailure)
        .expect("timeout reported");
    assert!(timeout.message.contains("did not finish within 20 ms"), "{}", timeout.message);
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn explicit_commands_surface_persistence_errors() {
    let repo = Arc::new(TestRepository::default());
    repo.fail(true);
    let service = service(&repo);

    let err = service.update_anchor(&trooper(6)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
    assert!(service.records(&CharacterId::new("pc")).await.is_err());

    let diagnostic = service
        .record_choice(&CharacterId::new("pc"), HistoryEntry::accepted("cleave", "melee", 6))
        .await
        .expect("append failure is reported");
    assert_eq!(diagnostic.kind, ErrorKind::PersistenceFailure);
}

#[tokio::test]
async fn catalog_outage_returns_empty_with_diagnostic() {
    let repo = Arc::new(TestRepository::default());
    let service = SuggestionService::builder()
        .catalog(FlakyCatalog::new(true).0)
        .shared_repository(repo.clone())
        .build();

    let response = service
        .get_suggestions(&trooper(6), &SuggestionRequest::new("level_up", "feat"))
        .await;

    assert!(response.suggestions.is_empty());
    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].kind, ErrorKind::DataUnavailable);
    assert_eq!(repo.anchor_saves(), 0);
}

#[tokio::test]
async fn catalog_outage_after_success_serves_last_known_good() {
    let (catalog, down) = FlakyCatalog::new(false);
    let service = SuggestionService::builder().catalog(catalog).build();
    let request = SuggestionRequest::new("level_up", "feat");

    let healthy = service.get_suggestions(&trooper(6), &request).await;
    down.store(true, Ordering::SeqCst);
    let degraded = service.get_suggestions(&trooper(7), &request).await;

    assert_eq!(degraded.source, ResponseSource::LastKnownGood);
    assert_eq!(degraded.ids(), healthy.ids());
    assert!(has_kind(&degraded.diagnostics, ErrorKind::DataUnavailable));
}

#[tokio::test]
async fn invalid_state_is_sanitized_and_reported() {
    let service = SuggestionService::builder().catalog(catalog()).build();
    let mut state = trooper(0);
    state.attributes.strength = 250;

    let response = service
        .get_suggestions(&state, &SuggestionRequest::new("level_up", "feat"))
        .await;

    assert_eq!(response.source, ResponseSource::Computed);
    assert!(!response.suggestions.is_empty());
    let invalid = response
        .diagnostics
        .iter()
        .filter(|d| d.kind == ErrorKind::InvalidState)
        .count();
    assert_eq!(invalid, 2, "{:?}", response.diagnostics);
}
