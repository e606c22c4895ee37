//! Full recomputation of a persona from aggregate data.

use crate::domain::foundation::{Timestamp, ValidationError};

use super::aggregate::truncate_front;
use super::request::{session_mood_signals, signals_in_window};
use super::{
    calculate_confidence, calculate_mood_intensity, calculate_playstyle_scores,
    extract_behavioral_patterns, extract_library_patterns, infer_current_intent,
    infer_current_mood, library_mood, map_identity_traits_to_persona_traits, Game, GameSession,
    MoodEvent, MoodSource, Persona, PersonaParams, RawIdentityTraits, SessionRecord,
    SnapshotCause, SESSION_MOOD_INTENSITY,
};

/// Everything a refresh reads from the outside world.
#[derive(Debug, Clone, Default)]
pub struct RefreshInputs {
    pub games: Vec<Game>,
    pub sessions: Vec<GameSession>,
    pub identity: Option<RawIdentityTraits>,
}

/// Recomputes traits, patterns, playstyle, mood, intent and confidence.
///
/// Repository sessions replace the persona's retained sessions when any are
/// present. With no sessions at all, patterns come from the game library;
/// with no mood signal in the recency window, the library's hours-weighted
/// mood tags set the mood at an intensity scaled by the winning share. Directly reported mood signals (manual, feedback) are kept;
/// session-derived signals are rebuilt from the sessions in use. Malformed
/// input fails the whole computation and returns no state.
pub fn recompute_persona(
    persona: &Persona,
    inputs: &RefreshInputs,
    now: Timestamp,
    params: &PersonaParams,
) -> Result<Persona, ValidationError> {
    for game in &inputs.games {
        game.validate()?;
    }
    let mut sessions: Vec<SessionRecord> = inputs
        .sessions
        .iter()
        .map(GameSession::to_record)
        .collect::<Result<_, _>>()?;

    if sessions.is_empty() {
        sessions = persona.recent_sessions.clone();
    }
    sessions.sort_by_key(|s| s.start);
    truncate_front(&mut sessions, params.session_cap);

    let mut signals: Vec<MoodEvent> = persona
        .recent_moods
        .iter()
        .filter(|s| s.source() != MoodSource::Session)
        .cloned()
        .chain(sessions.iter().flat_map(session_mood_signals))
        .collect();
    signals.sort_by_key(MoodEvent::timestamp);
    truncate_front(&mut signals, params.mood_signal_cap);

    let mut next = persona.clone();
    if let Some(raw) = &inputs.identity {
        next.traits = map_identity_traits_to_persona_traits(raw);
    }
    next.behavioral_patterns = if sessions.is_empty() {
        extract_library_patterns(&inputs.games)
    } else {
        extract_behavioral_patterns(&sessions)
    };
    next.current_intent = infer_current_intent(&next.behavioral_patterns);
    next.playstyle = calculate_playstyle_scores(&next.behavioral_patterns, &next.traits);

    let in_window = signals_in_window(&signals, now, params);
    match library_mood(&inputs.games) {
        Some((mood, share)) if in_window.is_empty() => {
            next.current_mood = mood;
            next.mood_intensity = SESSION_MOOD_INTENSITY * share;
        }
        _ => {
            next.current_mood = infer_current_mood(&signals, now, &params.inference);
            next.mood_intensity = calculate_mood_intensity(&in_window);
        }
    }
    next.games_observed = u32::try_from(inputs.games.len()).unwrap_or(u32::MAX);
    next.confidence = calculate_confidence(
        sessions.len(),
        signals.len(),
        inputs.games.len(),
        next.feedback.len(),
    );
    next.recent_sessions = sessions;
    next.recent_moods = signals;
    next.last_updated = now;
    next.pending_data_points = 0;
    next.record_snapshot(now, SnapshotCause::Refresh, params.history_cap);

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{GameId, UserId};
    use crate::domain::persona::{
        process_persona_event, should_refresh_persona, Intent, Mood, PersonaUpdateRequest,
        TraitName,
    };

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    fn persona() -> Persona {
        Persona::new_default(UserId::new("player-1").unwrap())
    }

    fn row(game: &str, minutes_ago: i64, duration: f64, moods: Vec<Mood>) -> GameSession {
        GameSession {
            game_id: GameId::new(game).unwrap(),
            duration_minutes: duration,
            moods,
            timestamp: now().plus_secs(-minutes_ago * 60),
            genre: None,
        }
    }

    #[test]
    fn refresh_without_data_keeps_defaults() {
        let params = PersonaParams::default();
        let next = recompute_persona(&persona(), &RefreshInputs::default(), now(), &params).unwrap();
        assert_eq!(next.current_mood(), Mood::Neutral);
        assert_eq!(next.current_intent(), Intent::Casual);
        assert_eq!(next.confidence(), 0.0);
        assert_eq!(next.last_updated(), now());
        assert!(!should_refresh_persona(&next, now(), &params));
    }

    #[test]
    fn refresh_recomputes_from_repository_data() {
        let params = PersonaParams::default();
        let inputs = RefreshInputs {
            games: vec![Game {
                title: "Rocket League".into(),
                hours_played: 120.0,
                moods: vec![Mood::Competitive],
                genre: Some("sports".into()),
            }],
            sessions: vec![
                row("rocket-league", 300, 20.0, vec![Mood::Competitive, Mood::Focused]),
                row("rocket-league", 200, 25.0, vec![Mood::Competitive, Mood::Focused]),
                row("rocket-league", 100, 15.0, vec![Mood::Competitive]),
            ],
            identity: Some([(TraitName::Competitiveness, 90.0)].into_iter().collect()),
        };
        let next = recompute_persona(&persona(), &inputs, now(), &params).unwrap();
        assert_eq!(next.current_mood(), Mood::Competitive);
        assert_eq!(next.current_intent(), Intent::Challenge);
        assert_eq!(next.recent_sessions().len(), 3);
        assert_eq!(next.games_observed(), 1);
        assert!((next.traits()[&TraitName::Competitiveness] - 0.8).abs() < 1e-9);
        assert!(next.confidence() > 0.0);
        assert_eq!(next.pending_data_points(), 0);
    }

    #[test]
    fn refresh_keeps_manual_signals_and_resets_pending() {
        let params = PersonaParams::default();
        let event = MoodEvent::new(Mood::Chill, 7.0, MoodSource::Manual, now().plus_secs(-60)).unwrap();
        let p = process_persona_event(&persona(), &PersonaUpdateRequest::MoodEvent(event), &params)
            .unwrap();
        assert_eq!(p.pending_data_points(), 1);

        let next = recompute_persona(&p, &RefreshInputs::default(), now(), &params).unwrap();
        assert_eq!(next.current_mood(), Mood::Chill);
        assert_eq!(next.pending_data_points(), 0);
        assert_eq!(next.recent_moods().len(), 1);
    }

    #[test]
    fn library_only_user_gets_mood_and_intent_from_games() {
        let params = PersonaParams::default();
        let inputs = RefreshInputs {
            games: vec![
                Game {
                    title: "Rocket League".into(),
                    hours_played: 90.0,
                    moods: vec![Mood::Competitive],
                    genre: Some("sports".into()),
                },
                Game {
                    title: "Celeste".into(),
                    hours_played: 10.0,
                    moods: vec![Mood::Focused],
                    genre: Some("platformer".into()),
                },
            ],
            ..RefreshInputs::default()
        };
        let next = recompute_persona(&persona(), &inputs, now(), &params).unwrap();
        assert_eq!(next.current_mood(), Mood::Competitive);
        assert!((next.mood_intensity() - 4.5).abs() < 1e-9);
        assert_eq!(next.current_intent(), Intent::Challenge);
        assert!(next.recent_sessions().is_empty());
    }

    #[test]
    fn recent_signals_outrank_library_tags() {
        let params = PersonaParams::default();
        let event = MoodEvent::new(Mood::Tired, 6.0, MoodSource::Manual, now().plus_secs(-600)).unwrap();
        let p = process_persona_event(&persona(), &PersonaUpdateRequest::MoodEvent(event), &params)
            .unwrap();
        let inputs = RefreshInputs {
            games: vec![Game {
                title: "Rocket League".into(),
                hours_played: 90.0,
                moods: vec![Mood::Competitive],
                genre: None,
            }],
            ..RefreshInputs::default()
        };
        let next = recompute_persona(&p, &inputs, now(), &params).unwrap();
        assert_eq!(next.current_mood(), Mood::Tired);
        assert_eq!(next.mood_intensity(), 6.0);
    }

    #[test]
    fn malformed_session_aborts_refresh() {
        let params = PersonaParams::default();
        let inputs = RefreshInputs {
            sessions: vec![row("broken", 10, f64::NAN, vec![])],
            ..RefreshInputs::default()
        };
        assert!(recompute_persona(&persona(), &inputs, now(), &params).is_err());
    }

    #[test]
    fn malformed_game_aborts_refresh() {
        let params = PersonaParams::default();
        let inputs = RefreshInputs {
            games: vec![Game {
                title: "Broken".into(),
                hours_played: -3.0,
                moods: vec![],
                genre: None,
            }],
            ..RefreshInputs::default()
        };
        assert!(recompute_persona(&persona(), &inputs, now(), &params).is_err());
    }
}
