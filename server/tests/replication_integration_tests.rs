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

//! Integration tests for replication across several nodes

use minimotes_common::{CreatureState, PlayerId};
use minimotes_server::Session;
use minimotes_server::config::Configuration;
use minimotes_server::session::{ScriptedStimulus, SessionOptions, StimulusKind};
use std::io::Write;

const DT: f32 = 0.25;

fn busy_script() -> Vec<ScriptedStimulus> {
    vec![
        ScriptedStimulus::new(0.0, StimulusKind::Spot).with_player(1),
        ScriptedStimulus::new(0.5, StimulusKind::Spot)
            .with_player(2)
            .on_creature(1),
        ScriptedStimulus::new(1.0, StimulusKind::Spot).with_player(2),
        ScriptedStimulus::new(3.0, StimulusKind::Grab),
        ScriptedStimulus::new(3.5, StimulusKind::Hurt),
        ScriptedStimulus::new(4.0, StimulusKind::EnterHaul),
        ScriptedStimulus::new(4.5, StimulusKind::Release),
        ScriptedStimulus::new(6.0, StimulusKind::Grab).on_creature(1),
        ScriptedStimulus::new(8.0, StimulusKind::Release).on_creature(1),
        ScriptedStimulus::new(10.0, StimulusKind::DespawnPlayer).with_player(2),
        ScriptedStimulus::new(12.0, StimulusKind::LeaveHaul),
    ]
}

fn lossy_session(duplicate_rate: f64, reorder: bool, seed: u64) -> Session {
    let mut options = SessionOptions {
        nodes: 3,
        creatures: 2,
        players: 2,
        duplicate_rate,
        reorder,
        script: busy_script(),
        ..SessionOptions::default()
    };
    options.settings.seed = seed;
    Session::new(options).unwrap()
}

#[test]
fn test_nodes_agree_after_every_step() {
    for seed in [1, 7, 42] {
        let mut session = lossy_session(0.5, true, seed);
        for _ in 0..120 {
            session.step(DT);
            assert!(
                session.converged(),
                "seed {} diverged at {:.2}s: {:?} / {:?}",
                seed,
                session.elapsed(),
                session.states(0),
                session.states(1)
            );
        }
        assert_eq!(session.pending_stimuli(), 0);
    }
}

#[test]
fn test_duplicates_inflate_deliveries_only() {
    let mut clean = lossy_session(0.0, false, 5);
    let mut noisy = lossy_session(1.0, false, 5);
    clean.run_for(6.0, DT);
    noisy.run_for(6.0, DT);

    assert!(clean.deliveries() > 0);
    assert_eq!(noisy.deliveries(), clean.deliveries() * 2);
    assert_eq!(clean.states(0), noisy.states(0));
    assert_eq!(clean.states(1), noisy.states(1));
}

#[test]
fn test_observers_follow_the_authority() {
    let mut session = lossy_session(0.0, false, 3);
    let id = session.creatures()[0];

    session.step(DT);
    for node in session.nodes() {
        assert_eq!(node.state_of(id), Some(CreatureState::Notice));
        assert_eq!(node.target_of(id), Some(PlayerId(1)));
    }
    assert!(session.authority().is_authority());
    assert!(!session.node(1).unwrap().is_authority());

    // Detections reported to an observer are ignored there
    let observer = session.node_mut(2).unwrap();
    assert!(!observer.on_vision(id, PlayerId(2)).unwrap());
    assert_eq!(observer.target_of(id), Some(PlayerId(1)));
}

#[test]
fn test_observer_signals_do_not_drive_behavior() {
    let mut session = lossy_session(0.0, false, 9);
    let id = session.creatures()[1];

    session.node_mut(1).unwrap().set_grabbed(id, true).unwrap();
    session.run_for(1.0, DT);

    for node in session.nodes() {
        assert_eq!(node.state_of(id), Some(CreatureState::Notice));
    }
}

#[test]
fn test_session_from_config_file() {
    let mut file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
    writeln!(
        file,
        r#"
simulation:
  nodes: "2"
  creatures: "1"
  players: "1"
  seed: "17"
  duplicate_rate: "0.3"
  reorder: "true"
script:
  - {{ at: 0.0, action: spot, player: 1 }}
  - {{ at: 2.0, action: grab }}
"#
    )
    .unwrap();

    let config = Configuration::load(file.path().to_str().unwrap()).unwrap();
    let mut session = Session::from_config(&config).unwrap();
    assert_eq!(session.nodes().len(), 2);
    assert_eq!(session.creatures().len(), 1);

    session.run_for(3.0, DT);
    assert!(session.converged());
    assert_eq!(
        session.states(0),
        vec![Some(CreatureState::Grabbed), Some(CreatureState::Grabbed)]
    );
}

#[test]
fn test_invalid_script_is_rejected() {
    let options = SessionOptions {
        script: vec![ScriptedStimulus::new(0.0, StimulusKind::Grab).on_creature(4)],
        ..SessionOptions::default()
    };
    assert!(Session::new(options).is_err());
}
