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

//! Facial expressions and their paired audio cues

use crate::ecs::capabilities::PresentationSink;
use serde::{Deserialize, Serialize};

/// Facial expression, one blend shape per variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expression {
    #[default]
    Blank,
    Happy,
    Happy2,
    Notice,
    Sad,
    Scared,
    Angry,
    Curious,
    Hit,
    Sleep,
    Sleep2,
}

impl Expression {
    pub const ALL: [Expression; 11] = [
        Expression::Blank,
        Expression::Happy,
        Expression::Happy2,
        Expression::Notice,
        Expression::Sad,
        Expression::Scared,
        Expression::Angry,
        Expression::Curious,
        Expression::Hit,
        Expression::Sleep,
        Expression::Sleep2,
    ];

    /// Expressions shown when settling into `Idle`
    pub const IDLE: [Expression; 3] = [Expression::Happy, Expression::Happy2, Expression::Curious];

    /// Expressions shown when falling asleep in storage
    pub const SLEEP: [Expression; 4] = [
        Expression::Sleep,
        Expression::Sleep2,
        Expression::Happy,
        Expression::Happy2,
    ];

    /// Blend shape index
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Audio cue played whenever this expression is displayed
    pub fn cue(&self) -> Option<AudioCue> {
        match self {
            Expression::Angry => Some(AudioCue::Angry),
            Expression::Curious => Some(AudioCue::Curious),
            Expression::Happy | Expression::Happy2 => Some(AudioCue::Happy),
            Expression::Sleep | Expression::Sleep2 => Some(AudioCue::Sleep),
            Expression::Sad => Some(AudioCue::Sad),
            Expression::Blank
            | Expression::Notice
            | Expression::Scared
            | Expression::Hit => None,
        }
    }
}

/// Audio clips a creature can voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    Angry,
    Curious,
    Happy,
    Sleep,
    Sad,
}

/// Full blend shape weight
pub const FULL_WEIGHT: f32 = 100.0;

/// Currently displayed face
///
/// Every change zeroes all blend shapes before setting the new one, so at most
/// one expression carries weight at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Face {
    current: Expression,
    weight: f32,
}

impl Face {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Expression {
        self.current
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Display `expression` at `weight` (clamped to 0..=100) and voice its cue
    pub fn show(&mut self, sink: &mut dyn PresentationSink, expression: Expression, weight: f32) {
        self.reset(sink);
        self.current = expression;
        self.weight = weight.clamp(0.0, FULL_WEIGHT);
        sink.set_expression_weight(expression, self.weight);
        if let Some(cue) = expression.cue() {
            sink.play_audio_cue(cue);
        }
    }

    /// Zero every blend shape without voicing anything
    pub fn clear(&mut self, sink: &mut dyn PresentationSink) {
        self.reset(sink);
        self.current = Expression::Blank;
        self.weight = 0.0;
    }

    fn reset(&self, sink: &mut dyn PresentationSink) {
        for expression in Expression::ALL {
            sink.set_expression_weight(expression, 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::capabilities::MockPresentationSink;
    use crate::ecs::components::Presentation;
    use mockall::predicate::eq;

    #[test]
    fn test_cue_lookup_shares_clips() {
        assert_eq!(Expression::Happy.cue(), Some(AudioCue::Happy));
        assert_eq!(Expression::Happy2.cue(), Some(AudioCue::Happy));
        assert_eq!(Expression::Sleep2.cue(), Some(AudioCue::Sleep));
        assert_eq!(Expression::Scared.cue(), None);
    }

    #[test]
    fn test_show_is_exclusive() {
        let mut sink = Presentation::new();
        let mut face = Face::new();

        face.show(&mut sink, Expression::Angry, FULL_WEIGHT);
        face.show(&mut sink, Expression::Sad, FULL_WEIGHT);

        assert_eq!(face.current(), Expression::Sad);
        assert_eq!(sink.active_expressions(), vec![Expression::Sad]);
        assert_eq!(sink.cue_count(AudioCue::Angry), 1);
        assert_eq!(sink.cue_count(AudioCue::Sad), 1);
    }

    #[test]
    fn test_show_clamps_weight() {
        let mut sink = Presentation::new();
        let mut face = Face::new();
        face.show(&mut sink, Expression::Curious, 250.0);
        assert_eq!(sink.expression_weight(Expression::Curious), FULL_WEIGHT);
    }

    #[test]
    fn test_show_voices_cue_exactly_once() {
        let mut sink = MockPresentationSink::new();
        sink.expect_set_expression_weight().return_const(());
        sink.expect_play_audio_cue()
            .with(eq(AudioCue::Curious))
            .times(1)
            .return_const(());

        Face::new().show(&mut sink, Expression::Curious, FULL_WEIGHT);
    }

    #[test]
    fn test_clear_is_silent() {
        let mut sink = MockPresentationSink::new();
        sink.expect_set_expression_weight()
            .with(mockall::predicate::always(), eq(0.0))
            .times(Expression::ALL.len())
            .return_const(());
        sink.expect_play_audio_cue().times(0);

        let mut face = Face::new();
        face.clear(&mut sink);
        assert_eq!(face.current(), Expression::Blank);
    }
}
