//! Shared fixtures for runtime integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use advisor_core::{
    AnchorPair, Attribute, Attributes, BuildGoal, CandidateOption, CharacterId, CharacterState,
    HistoryEntry, OptionKind, PivotState, Prerequisite,
};
use advisor_runtime::{
    AdviceRecord, AdviceRepository, HistoryRepository, IdentityRepository, InMemoryRepository,
    LastShown, RepositoryError, StaticCatalogProvider,
};
use advisor_runtime::repository::Result as RepoResult;

pub fn catalog() -> StaticCatalogProvider {
    StaticCatalogProvider::new(vec![
        CandidateOption::new("armor_mastery", "Armor Mastery", OptionKind::Feat).with_theme("armor"),
        CandidateOption::new("cleave", "Cleave", OptionKind::Feat)
            .with_theme("melee")
            .with_prerequisite(Prerequisite::Option {
                id: "power_attack".into(),
            }),
        CandidateOption::new("persuasive", "Persuasive", OptionKind::Feat).with_theme("social"),
        CandidateOption::new("great_cleave", "Great Cleave", OptionKind::Feat)
            .with_theme("melee")
            .with_prerequisite(Prerequisite::Level { min: 9 }),
        CandidateOption::new("battle_hardened", "Battle Hardened", OptionKind::Talent)
            .with_theme("armor"),
    ])
}

pub fn trooper(level: u32) -> CharacterState {
    let mut state = CharacterState::new("pc", level);
    state.species_id = "human".into();
    state.class_ids = vec!["soldier".into()];
    state.attributes = Attributes::new(16, 14, 12, 10, 10, 8);
    state.feats = vec!["power_attack".into()];
    state.goals.push(BuildGoal {
        id: "elite_trooper".into(),
        name: "Elite Trooper".into(),
        required_options: vec!["power_attack".into(), "armor_mastery".into()],
        related_options: vec![],
        typical_attributes: vec![Attribute::Strength],
    });
    state
}

pub fn melee_history(count: u32) -> Vec<HistoryEntry> {
    (1..=count)
        .map(|level| HistoryEntry::accepted(format!("melee_{level}"), "melee", level))
        .collect()
}

/// In-memory repository that can be made to fail, slowed down, or gated.
#[derive(Default)]
pub struct TestRepository {
    pub inner: InMemoryRepository,
    pub failing: AtomicBool,
    pub delay: Mutex<Option<Duration>>,
    /// The first history load blocks until this receiver yields.
    pub gate: Mutex<Option<Receiver<()>>>,
    pub gate_entered: AtomicBool,
    pub anchor_saves: AtomicUsize,
}

impl TestRepository {
    pub fn with_history(character: &str, history: Vec<HistoryEntry>) -> Self {
        Self {
            inner: InMemoryRepository::with_history(CharacterId::new(character), history),
            ..Self::default()
        }
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn anchor_saves(&self) -> usize {
        self.anchor_saves.load(Ordering::SeqCst)
    }

    fn check(&self) -> RepoResult<()> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Io(std::io::Error::other("disk unplugged")));
        }
        Ok(())
    }
}

impl HistoryRepository for TestRepository {
    fn append(&self, character: &CharacterId, entry: &HistoryEntry) -> RepoResult<()> {
        self.check()?;
        self.inner.append(character, entry)
    }

    fn load(&self, character: &CharacterId) -> RepoResult<Vec<HistoryEntry>> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            self.gate_entered.store(true, Ordering::SeqCst);
            let _ = gate.recv();
        }
        self.check()?;
        self.inner.load(character)
    }
}

impl IdentityRepository for TestRepository {
    fn load_anchors(&self, character: &CharacterId) -> RepoResult<Option<AnchorPair>> {
        self.check()?;
        self.inner.load_anchors(character)
    }

    fn save_anchors(&self, character: &CharacterId, anchors: &AnchorPair) -> RepoResult<()> {
        self.check()?;
        self.anchor_saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save_anchors(character, anchors)
    }

    fn load_pivot(&self, character: &CharacterId) -> RepoResult<Option<PivotState>> {
        self.check()?;
        self.inner.load_pivot(character)
    }

    fn save_pivot(&self, character: &CharacterId, pivot: &PivotState) -> RepoResult<()> {
        self.check()?;
        self.inner.save_pivot(character, pivot)
    }
}

impl AdviceRepository for TestRepository {
    fn load_advice(&self, character: &CharacterId, step: &str) -> RepoResult<Option<AdviceRecord>> {
        self.check()?;
        self.inner.load_advice(character, step)
    }

    fn save_advice(&self, character: &CharacterId, record: &AdviceRecord) -> RepoResult<()> {
        self.check()?;
        self.inner.save_advice(character, record)
    }

    fn load_last_shown(&self, character: &CharacterId, context: &str) -> RepoResult<Option<LastShown>> {
        self.check()?;
        self.inner.load_last_shown(character, context)
    }

    fn save_last_shown(&self, character: &CharacterId, shown: &LastShown) -> RepoResult<()> {
        self.check()?;
        self.inner.save_last_shown(character, shown)
    }
}
