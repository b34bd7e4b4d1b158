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

use crate::ecs::capabilities::{FloorRegion, StaticLevel};
use crate::ecs::components::CreatureTuning;
use crate::ecs::systems::PresentationSettings;
use crate::session::ScriptedStimulus;
use clap::Parser;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_env_field::EnvField;
use std::num::{ParseFloatError, ParseIntError};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to configuration file",
        default_value = "server/config.yaml"
    )]
    pub config_file: String,

    #[arg(
        short = 'e',
        long = "env",
        help = "Path to environment file",
        default_value = "server/.env"
    )]
    pub env_file: Option<String>,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            config_file: "config.yaml".to_string(),
            env_file: Some(".env".to_string()),
        }
    }
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to open config file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub simulation: SimulationConfig,
    pub creature: CreatureTuning,
    pub presentation: PresentationSettings,
    pub level: LevelConfig,
    pub script: Vec<ScriptedStimulus>,
}

impl Configuration {
    pub fn load(path: &str) -> Result<Configuration, ConfigError> {
        let file = std::fs::File::open(path).map_err(|source| ConfigError::Open {
            path: path.to_string(),
            source,
        })?;
        let conf: Configuration = serde_yaml::from_reader(file)?;
        conf.validate()?;
        Ok(conf)
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let simulation = &self.simulation;
        if simulation.nodes.count() == 0 {
            return Err(ConfigError::Invalid("simulation.nodes must be at least 1".into()));
        }
        if simulation.creatures.count() == 0 {
            return Err(ConfigError::Invalid("simulation.creatures must be at least 1".into()));
        }
        if simulation.tick_rate.hertz() <= 0.0 {
            return Err(ConfigError::Invalid("simulation.tick_rate must be positive".into()));
        }
        if simulation.duration.seconds() < 0.0 {
            return Err(ConfigError::Invalid("simulation.duration must not be negative".into()));
        }
        if !(0.0..=1.0).contains(&*simulation.duplicate_rate) {
            return Err(ConfigError::Invalid(
                "simulation.duplicate_rate must be within [0, 1]".into(),
            ));
        }
        self.creature
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("creature: {}", e)))?;
        self.presentation
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("presentation: {}", e)))?;
        for stimulus in &self.script {
            stimulus
                .validate(simulation.creatures.count())
                .map_err(|e| ConfigError::Invalid(format!("script: {}", e)))?;
        }
        Ok(())
    }
}

/// How the headless host runs
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of nodes; node 0 is the authority
    pub nodes: EnvField<NodeCount>,
    pub creatures: EnvField<CreatureCount>,
    pub players: EnvField<PlayerCount>,
    pub tick_rate: EnvField<TickRate>,
    pub duration: EnvField<RunDuration>,
    /// Pace ticks against the wall clock instead of running flat out
    pub realtime: EnvField<bool>,
    pub seed: EnvField<u64>,
    /// Chance that a replication delivery is duplicated
    pub duplicate_rate: EnvField<f64>,
    /// Shuffle each batch of deliveries a node drains
    pub reorder: EnvField<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCount(usize);

impl NodeCount {
    pub fn count(&self) -> usize {
        self.0
    }
}

impl FromStr for NodeCount {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl Default for NodeCount {
    fn default() -> Self {
        Self(3)
    }
}

impl std::fmt::Display for NodeCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureCount(usize);

impl CreatureCount {
    pub fn count(&self) -> usize {
        self.0
    }
}

impl FromStr for CreatureCount {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl Default for CreatureCount {
    fn default() -> Self {
        Self(1)
    }
}

impl std::fmt::Display for CreatureCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCount(u32);

impl PlayerCount {
    pub fn count(&self) -> u32 {
        self.0
    }
}

impl FromStr for PlayerCount {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl Default for PlayerCount {
    fn default() -> Self {
        Self(2)
    }
}

impl std::fmt::Display for PlayerCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Simulation ticks per second
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickRate(f32);

impl TickRate {
    pub fn hertz(&self) -> f32 {
        self.0
    }

    /// Seconds per tick
    pub fn delta_time(&self) -> f32 {
        1.0 / self.0
    }
}

impl FromStr for TickRate {
    type Err = ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl Default for TickRate {
    fn default() -> Self {
        Self(30.0)
    }
}

impl std::fmt::Display for TickRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}Hz", self.0)
    }
}

/// Simulated seconds to run before exiting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunDuration(f32);

impl RunDuration {
    pub fn seconds(&self) -> f32 {
        self.0
    }
}

impl FromStr for RunDuration {
    type Err = ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl Default for RunDuration {
    fn default() -> Self {
        Self(30.0)
    }
}

impl std::fmt::Display for RunDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Level geometry; omitted parts fall back to the default courtyard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub level_points: Option<Vec<Vec3>>,
    pub floors: Option<Vec<FloorRegion>>,
    /// Creature spawn positions, cycled in spawn order
    pub spawn_points: Vec<Vec3>,
}

impl LevelConfig {
    pub fn to_level(&self) -> StaticLevel {
        let fallback = StaticLevel::default();
        StaticLevel::new(
            self.level_points.clone().unwrap_or(fallback.level_points),
            self.floors.clone().unwrap_or(fallback.floors),
        )
    }
}
