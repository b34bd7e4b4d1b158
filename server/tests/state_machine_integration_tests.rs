//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Integration tests for the creature state machine driven through a session

use minimotes_common::{CreatureState, NetworkId};
use minimotes_server::Session;
use minimotes_server::ecs::capabilities::{SurfaceId, anim};
use minimotes_server::ecs::components::{CreatureBrain, Expression};
use minimotes_server::session::{ScriptedStimulus, SessionOptions, StimulusKind};

const DT: f32 = 0.25;

fn single_node(script: Vec<ScriptedStimulus>) -> Session {
    Session::new(SessionOptions {
        script,
        ..SessionOptions::default()
    })
    .unwrap()
}

fn creature(session: &Session) -> NetworkId {
    session.creatures()[0]
}

fn state(session: &Session) -> CreatureState {
    session.authority().state_of(creature(session)).unwrap()
}

fn with_brain<R>(session: &Session, read: impl FnOnce(&CreatureBrain) -> R) -> R {
    let node = session.authority();
    let entity = node.creature(creature(session)).unwrap();
    let brain = node.world().get::<&CreatureBrain>(entity).unwrap();
    read(&brain)
}

fn weight(session: &Session, expression: Expression) -> f32 {
    session
        .authority()
        .presentation_of(creature(session))
        .unwrap()
        .expression_weight(expression)
}

#[test]
fn test_spotted_creature_notices_flees_and_is_caught() {
    let mut session = single_node(vec![
        ScriptedStimulus::new(0.0, StimulusKind::Spot).with_player(1),
    ]);
    assert_eq!(state(&session), CreatureState::Idle);

    session.step(DT);
    assert_eq!(state(&session), CreatureState::Notice);

    // Entry actions run on the tick after the transition
    session.step(DT);
    assert_eq!(weight(&session, Expression::Notice), 100.0);
    assert_eq!(with_brain(&session, |b| b.state_timer()), 0.75);

    session.step(DT);
    session.step(DT);
    assert_eq!(state(&session), CreatureState::Notice);
    session.step(DT);
    assert_eq!(state(&session), CreatureState::Flee);

    session.step(DT);
    assert_eq!(state(&session), CreatureState::Flee);
    assert_eq!(weight(&session, Expression::Scared), 100.0);
    let flee_timer = with_brain(&session, |b| b.state_timer());
    assert!((8.0..=12.0).contains(&flee_timer), "flee timer was {}", flee_timer);
    assert!(with_brain(&session, |b| b.destination()).is_some());

    let id = creature(&session);
    session.node_mut(0).unwrap().set_grabbed(id, true).unwrap();
    session.step(DT);
    assert_eq!(state(&session), CreatureState::Grabbed);
    assert_eq!(with_brain(&session, |b| b.state_timer()), 0.0);
    let sink = session.authority().presentation_of(id).unwrap();
    assert!(!sink.animation_bool(anim::RUN_AWAY));
}

#[test]
fn test_flee_times_out_back_to_idle() {
    let mut session = single_node(vec![
        ScriptedStimulus::new(0.0, StimulusKind::Spot).with_player(1),
    ]);
    while state(&session) != CreatureState::Flee {
        session.step(DT);
    }

    let mut ticks_in_flee = 1;
    loop {
        session.step(DT);
        if state(&session) != CreatureState::Flee {
            break;
        }
        ticks_in_flee += 1;
        assert!(ticks_in_flee < 100, "creature never stopped fleeing");
    }
    assert_eq!(state(&session), CreatureState::Idle);
    assert!((33..=49).contains(&ticks_in_flee), "fled for {} ticks", ticks_in_flee);

    // The player is still in view, so the creature notices it again at once
    session.step(DT);
    assert_eq!(state(&session), CreatureState::Notice);
}

#[test]
fn test_despawned_player_is_forgotten() {
    let mut session = single_node(vec![
        ScriptedStimulus::new(0.0, StimulusKind::Spot).with_player(1),
        ScriptedStimulus::new(2.0, StimulusKind::DespawnPlayer).with_player(1),
    ]);
    session.run_for(2.0, DT);
    assert_eq!(state(&session), CreatureState::Flee);
    assert!(session.authority().target_of(creature(&session)).is_some());

    session.run_for(13.0, DT);
    assert_eq!(state(&session), CreatureState::Idle);
    assert_eq!(session.authority().target_of(creature(&session)), None);
    assert_eq!(with_brain(&session, |b| b.target()), None);

    session.run_for(5.0, DT);
    assert_eq!(state(&session), CreatureState::Idle);
}

#[test]
fn test_released_creature_notices_after_release_timer() {
    let mut session = single_node(vec![
        ScriptedStimulus::new(0.0, StimulusKind::Grab),
        ScriptedStimulus::new(1.0, StimulusKind::Release),
    ]);
    session.step(DT);
    assert_eq!(state(&session), CreatureState::Grabbed);

    session.step(DT);
    assert_eq!(weight(&session, Expression::Scared), 100.0);

    // Held through t=1.0, then the one second release timer runs down
    session.run_for(1.25, DT);
    assert_eq!(state(&session), CreatureState::Grabbed);
    session.step(DT);
    assert_eq!(state(&session), CreatureState::Notice);
}

#[test]
fn test_calmdown_cue_plays_once_while_held() {
    let mut session = single_node(vec![ScriptedStimulus::new(0.0, StimulusKind::Grab)]);
    let id = creature(&session);
    let idle_sits = |session: &Session| {
        session
            .authority()
            .presentation_of(id)
            .unwrap()
            .trigger_count(anim::IDLE_SIT)
    };

    session.run_for(16.0 * DT, DT);
    assert_eq!(state(&session), CreatureState::Grabbed);
    assert_eq!(idle_sits(&session), 0);

    session.step(DT);
    assert_eq!(idle_sits(&session), 1);

    session.run_for(10.0, DT);
    assert_eq!(idle_sits(&session), 1);
    assert_eq!(state(&session), CreatureState::Grabbed);
}

#[test]
fn test_stashed_creature_falls_asleep_and_wakes_when_removed() {
    let mut session = single_node(vec![
        ScriptedStimulus::new(0.0, StimulusKind::Grab),
        ScriptedStimulus::new(0.5, StimulusKind::EnterHaul),
        ScriptedStimulus::new(1.0, StimulusKind::Release),
    ]);
    session.run_for(1.25, DT);
    assert_eq!(state(&session), CreatureState::Stashed);

    session.step(DT);
    assert_eq!(weight(&session, Expression::Happy), 100.0);
    assert!(!with_brain(&session, |b| b.is_asleep()));

    session.run_for(14.0 * DT, DT);
    assert!(!with_brain(&session, |b| b.is_asleep()));
    session.step(DT);
    assert!(with_brain(&session, |b| b.is_asleep()));

    let id = creature(&session);
    let sink = session.authority().presentation_of(id).unwrap();
    assert!(sink.animation_bool(anim::SLEEPING));
    let active = sink.active_expressions();
    assert_eq!(active.len(), 1);
    assert!(Expression::SLEEP.contains(&active[0]));

    session
        .apply(&ScriptedStimulus::new(0.0, StimulusKind::LeaveHaul))
        .unwrap();
    session.step(DT);
    assert_eq!(state(&session), CreatureState::Notice);
    let sink = session.authority().presentation_of(id).unwrap();
    assert!(!sink.animation_bool(anim::SLEEPING));
}

#[test]
fn test_grab_wins_over_stash() {
    let mut session = single_node(vec![
        ScriptedStimulus::new(0.0, StimulusKind::EnterHaul),
        ScriptedStimulus::new(0.0, StimulusKind::Grab),
    ]);
    session.step(DT);
    assert_eq!(state(&session), CreatureState::Grabbed);
    session.run_for(2.0, DT);
    assert_eq!(state(&session), CreatureState::Grabbed);
}

#[test]
fn test_hurt_plays_pulse_and_timeline() {
    let mut session = single_node(Vec::new());
    let id = creature(&session);
    session.step(DT);

    session
        .apply(&ScriptedStimulus::new(0.0, StimulusKind::Hurt))
        .unwrap();
    assert_eq!(weight(&session, Expression::Hit), 100.0);

    session.step(DT);
    let sink = session.authority().presentation_of(id).unwrap();
    assert!(sink.surface_intensity(SurfaceId(0)) > 0.0);
    assert_eq!(sink.expression_weight(Expression::Hit), 100.0);

    session.step(DT);
    let sink = session.authority().presentation_of(id).unwrap();
    assert_eq!(sink.surface_intensity(SurfaceId(0)), 0.0);
    assert_eq!(sink.expression_weight(Expression::Angry), 100.0);
    assert_eq!(state(&session), CreatureState::Idle);

    // Sulk lasts at most four seconds, then the face clears
    session.run_for(4.5, DT);
    let sink = session.authority().presentation_of(id).unwrap();
    assert!(sink.active_expressions().is_empty());
}
