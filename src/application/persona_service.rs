//! PersonaService - orchestrates persona reads, incremental updates and refreshes.
//!
//! Every read-compute-write sequence runs under the user's lock from
//! [`UserLocks`], so concurrent updates for one user never lose each other's
//! effects. Persistence is the last step: a failed validation or computation
//! leaves the stored persona untouched.

use std::sync::Arc;

use futures::try_join;
use tracing::{debug, info, warn};

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::persona::{
    build_insights, process_persona_event, recompute_persona, should_refresh_persona,
    CompoundMoodParams, DataFreshness, Persona, PersonaAnalysis, PersonaParams, PersonaState,
    PersonaUpdateRequest, RefreshInputs,
};
use crate::ports::{GamingDataReader, IdentityProvider, PersonaRepository};

use super::{PersonaError, UserLocks};

/// Source of "now". Injected so tests can pin time.
pub type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Timestamp::now)
}

/// Tuning for [`PersonaService`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonaServiceSettings {
    pub params: PersonaParams,
    pub compound_moods: CompoundMoodParams,
    /// Maximum sessions read from the repository per refresh.
    pub session_history_limit: usize,
}

impl Default for PersonaServiceSettings {
    fn default() -> Self {
        Self {
            params: PersonaParams::default(),
            compound_moods: CompoundMoodParams::default(),
            session_history_limit: 100,
        }
    }
}

pub struct PersonaService {
    personas: Arc<dyn PersonaRepository>,
    gaming_data: Arc<dyn GamingDataReader>,
    identity: Arc<dyn IdentityProvider>,
    settings: PersonaServiceSettings,
    locks: UserLocks,
    clock: Clock,
}

impl PersonaService {
    pub fn new(
        personas: Arc<dyn PersonaRepository>,
        gaming_data: Arc<dyn GamingDataReader>,
        identity: Arc<dyn IdentityProvider>,
        settings: PersonaServiceSettings,
    ) -> Self {
        Self {
            personas,
            gaming_data,
            identity,
            settings,
            locks: UserLocks::new(),
            clock: system_clock(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &PersonaServiceSettings {
        &self.settings
    }

    pub fn now(&self) -> Timestamp {
        (self.clock)()
    }

    /// Returns the user's persona, creating a default one on first read.
    ///
    /// Stale personas are refreshed before being returned.
    pub async fn get_persona(&self, user_id: &UserId) -> Result<Persona, PersonaError> {
        let _guard = self.locks.lock(user_id).await;
        let (persona, created) = self.load_or_default(user_id).await?;

        let now = self.now();
        if should_refresh_persona(&persona, now, &self.settings.params) {
            let (refreshed, _) = self.refresh_locked(&persona, now).await?;
            return Ok(refreshed);
        }
        if created {
            self.personas.save(&persona).await?;
        }
        Ok(persona)
    }

    /// Applies one incremental update and persists the result.
    ///
    /// Never triggers a refresh; staleness is resolved on the next read.
    pub async fn update_persona(
        &self,
        user_id: &UserId,
        request: &PersonaUpdateRequest,
    ) -> Result<Persona, PersonaError> {
        request.validate()?;

        let _guard = self.locks.lock(user_id).await;
        let (persona, _) = self.load_or_default(user_id).await?;
        let next = process_persona_event(&persona, request, &self.settings.params)?;
        self.personas.save(&next).await?;

        debug!(
            user_id = %user_id,
            event = request.kind(),
            mood = %next.current_mood(),
            pending = next.pending_data_points(),
            "Persona updated"
        );
        Ok(next)
    }

    /// Parses a JSON-encoded request, then behaves like [`Self::update_persona`].
    pub async fn update_persona_json(
        &self,
        user_id: &UserId,
        request: serde_json::Value,
    ) -> Result<Persona, PersonaError> {
        let request = PersonaUpdateRequest::from_json(request).map_err(|e| {
            warn!(user_id = %user_id, error = %e, "Rejected persona update request");
            e
        })?;
        self.update_persona(user_id, &request).await
    }

    /// Snapshot for the recommendation engine; `None` when the user has no gaming data.
    pub async fn get_persona_state(&self, user_id: &UserId) -> Result<Option<PersonaState>, PersonaError> {
        let persona = self.get_persona(user_id).await?;
        if !persona.has_session_data() && persona.games_observed() == 0 {
            debug!(user_id = %user_id, "No gaming data; no persona state");
            return Ok(None);
        }
        Ok(Some(PersonaState::from_persona(&persona)))
    }

    /// Forces a refresh and reports confidence, insights and data freshness.
    pub async fn analyze_persona(&self, user_id: &UserId) -> Result<PersonaAnalysis, PersonaError> {
        let _guard = self.locks.lock(user_id).await;
        let (persona, _) = self.load_or_default(user_id).await?;

        let now = self.now();
        let (refreshed, inputs) = self.refresh_locked(&persona, now).await?;

        Ok(PersonaAnalysis {
            confidence: refreshed.confidence(),
            insights: build_insights(&refreshed, &inputs.games, now, &self.settings.compound_moods),
            data_freshness: DataFreshness::of_persona(&refreshed, now),
        })
    }

    pub fn should_refresh_persona(&self, persona: &Persona) -> bool {
        should_refresh_persona(persona, self.now(), &self.settings.params)
    }

    /// Recomputes the persona from repository data and persists it.
    pub async fn refresh_persona(&self, user_id: &UserId) -> Result<Persona, PersonaError> {
        let _guard = self.locks.lock(user_id).await;
        let (persona, _) = self.load_or_default(user_id).await?;
        let (refreshed, _) = self.refresh_locked(&persona, self.now()).await?;
        Ok(refreshed)
    }

    async fn load_or_default(&self, user_id: &UserId) -> Result<(Persona, bool), PersonaError> {
        match self.personas.find_by_user(user_id).await? {
            Some(persona) => Ok((persona, false)),
            None => {
                debug!(user_id = %user_id, "No stored persona; starting from default");
                Ok((Persona::new_default(user_id.clone()), true))
            }
        }
    }

    /// Read-compute-write. Caller holds the user's lock.
    async fn refresh_locked(
        &self,
        persona: &Persona,
        now: Timestamp,
    ) -> Result<(Persona, RefreshInputs), PersonaError> {
        let user_id = persona.user_id();
        let (games, sessions, identity) = try_join!(
            self.gaming_data.get_user_games(user_id),
            self.gaming_data
                .get_game_session_history(user_id, None, self.settings.session_history_limit),
            self.identity.get_identity_traits(user_id),
        )?;
        let inputs = RefreshInputs {
            games,
            sessions,
            identity,
        };

        let refreshed = recompute_persona(persona, &inputs, now, &self.settings.params).map_err(|e| {
            warn!(user_id = %user_id, error = %e, "Persona refresh aborted; stored persona kept");
            PersonaError::Compute(e)
        })?;
        self.personas.save(&refreshed).await?;

        info!(
            user_id = %user_id,
            mood = %refreshed.current_mood(),
            intent = %refreshed.current_intent(),
            confidence = refreshed.confidence(),
            sessions = inputs.sessions.len(),
            games = inputs.games.len(),
            "Persona refreshed"
        );
        Ok((refreshed, inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryGamingData, InMemoryPersonaRepository, StaticIdentityProvider,
    };
    use crate::domain::foundation::GameId;
    use crate::domain::persona::{
        Game, GameSession, Intent, Mood, MoodEvent, MoodSource, TraitName,
    };
    use crate::ports::RepositoryError;

    struct Fixture {
        repo: InMemoryPersonaRepository,
        data: InMemoryGamingData,
        identity: StaticIdentityProvider,
        service: PersonaService,
    }

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    fn user() -> UserId {
        UserId::new("player-1").unwrap()
    }

    fn fixture() -> Fixture {
        let repo = InMemoryPersonaRepository::new();
        let data = InMemoryGamingData::new();
        let identity = StaticIdentityProvider::new();
        let service = PersonaService::new(
            Arc::new(repo.clone()),
            Arc::new(data.clone()),
            Arc::new(identity.clone()),
            PersonaServiceSettings::default(),
        )
        .with_clock(Arc::new(now));
        Fixture {
            repo,
            data,
            identity,
            service,
        }
    }

    fn mood_request(mood: Mood, intensity: f64, secs_ago: i64) -> PersonaUpdateRequest {
        PersonaUpdateRequest::MoodEvent(
            MoodEvent::new(mood, intensity, MoodSource::Manual, now().plus_secs(-secs_ago)).unwrap(),
        )
    }

    fn session(game: &str, minutes_ago: i64, moods: Vec<Mood>) -> GameSession {
        GameSession {
            game_id: GameId::new(game).unwrap(),
            duration_minutes: 40.0,
            moods,
            timestamp: now().plus_secs(-minutes_ago * 60),
            genre: None,
        }
    }

    #[tokio::test]
    async fn new_user_gets_default_persona() {
        let f = fixture();
        let persona = f.service.get_persona(&user()).await.unwrap();

        assert_eq!(persona.current_mood(), Mood::Neutral);
        assert_eq!(persona.confidence(), 0.0);
        assert_eq!(persona.last_updated(), now());
        assert!(f.repo.find_by_user(&user()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn fresh_persona_is_not_refreshed_again() {
        let f = fixture();
        f.service.get_persona(&user()).await.unwrap();
        let saves = f.repo.save_count();

        let persona = f.service.get_persona(&user()).await.unwrap();
        assert!(!f.service.should_refresh_persona(&persona));
        assert_eq!(f.repo.save_count(), saves);
    }

    #[tokio::test]
    async fn update_applies_event_and_persists() {
        let f = fixture();
        let persona = f
            .service
            .update_persona(&user(), &mood_request(Mood::Chill, 5.0, 60))
            .await
            .unwrap();

        assert_eq!(persona.current_mood(), Mood::Chill);
        let stored = f.repo.find_by_user(&user()).await.unwrap().unwrap();
        assert_eq!(stored, persona);
    }

    #[tokio::test]
    async fn update_json_rejects_unknown_tag_without_writing() {
        let f = fixture();
        let result = f
            .service
            .update_persona_json(&user(), serde_json::json!({ "type": "purchase_event" }))
            .await;

        assert!(matches!(result, Err(PersonaError::Validation(_))));
        assert_eq!(f.repo.save_count(), 0);
    }

    #[tokio::test]
    async fn persona_state_is_none_without_gaming_data() {
        let f = fixture();
        assert!(f.service.get_persona_state(&user()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn persona_state_reflects_repository_sessions() {
        let f = fixture();
        f.data
            .add_session(&user(), session("celeste", 90, vec![Mood::Focused]))
            .await;

        let state = f.service.get_persona_state(&user()).await.unwrap().unwrap();
        assert_eq!(state.mood, Mood::Focused);
    }

    #[tokio::test]
    async fn refresh_uses_identity_traits() {
        let f = fixture();
        f.identity
            .set_traits(&user(), [(TraitName::Curiosity, 100.0)].into_iter().collect())
            .await;
        let persona = f.service.refresh_persona(&user()).await.unwrap();
        assert_eq!(persona.traits()[&TraitName::Curiosity], 1.0);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_prior_persona() {
        let f = fixture();
        let before = f
            .service
            .update_persona(&user(), &mood_request(Mood::Social, 6.0, 30))
            .await
            .unwrap();
        let mut broken = session("glitch", 10, vec![]);
        broken.duration_minutes = -5.0;
        f.data.add_session(&user(), broken).await;

        let result = f.service.refresh_persona(&user()).await;
        assert!(matches!(result, Err(PersonaError::Compute(_))));
        assert_eq!(f.repo.find_by_user(&user()).await.unwrap(), Some(before));
    }

    #[tokio::test]
    async fn out_of_range_session_duration_fails_refresh() {
        let f = fixture();
        let mut endless = session("idle-clicker", 10, vec![Mood::Chill]);
        endless.duration_minutes = 1e12;
        f.data.add_session(&user(), endless).await;

        let result = f.service.refresh_persona(&user()).await;
        assert!(matches!(result, Err(PersonaError::Compute(_))));
        assert!(matches!(
            f.service.get_persona(&user()).await,
            Err(PersonaError::Compute(_))
        ));
        assert_eq!(f.repo.save_count(), 0);
    }

    #[tokio::test]
    async fn repository_failure_propagates() {
        let f = fixture();
        f.data.set_unavailable(true);
        let result = f.service.refresh_persona(&user()).await;
        assert!(matches!(
            result,
            Err(PersonaError::Repository(RepositoryError::Unavailable(_)))
        ));
        assert_eq!(f.repo.save_count(), 0);
    }

    #[tokio::test]
    async fn analyze_reports_freshness_and_insights() {
        let f = fixture();
        f.data
            .add_game(
                &user(),
                Game {
                    title: "Celeste".into(),
                    hours_played: 25.0,
                    moods: vec![Mood::Focused],
                    genre: Some("platformer".into()),
                },
            )
            .await;
        f.data
            .add_session(&user(), session("celeste", 120, vec![Mood::Focused]))
            .await;

        let analysis = f.service.analyze_persona(&user()).await.unwrap();
        assert_eq!(analysis.data_freshness, DataFreshness::Fresh);
        assert!(analysis.confidence > 0.0);
        assert!(analysis
            .insights
            .contains(&"Most played game is Celeste (25 hours)".to_string()));
    }

    #[tokio::test]
    async fn analyze_library_only_reports_outdated() {
        let f = fixture();
        f.data
            .add_game(
                &user(),
                Game {
                    title: "Stardew Valley".into(),
                    hours_played: 60.0,
                    moods: vec![Mood::Chill],
                    genre: Some("sim".into()),
                },
            )
            .await;

        let analysis = f.service.analyze_persona(&user()).await.unwrap();
        assert_eq!(analysis.data_freshness, DataFreshness::Outdated);
        assert!(analysis.confidence > 0.0);
        assert!(analysis.insights.contains(&"Current mood is chill at intensity 5.0".to_string()));
    }

    #[tokio::test]
    async fn analyze_without_data_reports_none() {
        let f = fixture();
        let analysis = f.service.analyze_persona(&user()).await.unwrap();
        assert_eq!(analysis.data_freshness, DataFreshness::None);
        assert_eq!(analysis.confidence, 0.0);
    }

    #[tokio::test]
    async fn update_does_not_trigger_refresh() {
        let f = fixture();
        let persona = f
            .service
            .update_persona(&user(), &mood_request(Mood::Tired, 4.0, 10))
            .await
            .unwrap();
        assert_eq!(persona.last_updated(), Timestamp::epoch());
        assert_eq!(persona.current_intent(), Intent::Casual);
    }
}
