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

use clap::Parser;
use minimotes_server::Session;
use minimotes_server::config::{Arguments, Configuration};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load arguments from the command line
    let arguments: Arguments = Parser::parse();

    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .with_ansi(true)
        .init();

    // Load environment variables from .env file if specified
    if let Some(ref env_file) = arguments.env_file {
        if std::path::Path::new(env_file).exists() {
            tracing::debug!("Loading environment variables from file: {}", env_file);
            dotenv::from_filename(env_file).ok();
        }
    } else {
        tracing::debug!("Loading environment variables from default file");
        dotenv::dotenv().ok();
    }

    // Load configuration from a file with environment variable substitution
    let config = Configuration::load(&arguments.config_file)?;
    tracing::debug!("Configuration loaded: {:?}", config);

    let simulation = &config.simulation;
    let delta_time = simulation.tick_rate.delta_time();
    let duration = simulation.duration.seconds();
    tracing::info!(
        "Starting Minimotes simulation: {} nodes, {} creatures, {} players at {}",
        *simulation.nodes,
        *simulation.creatures,
        *simulation.players,
        *simulation.tick_rate
    );

    let mut session = Session::from_config(&config)?;
    session.authority().event_bus().subscribe(|event| {
        tracing::debug!(kind = event.kind(), entity = ?event.entity(), "{:?}", event)
    });

    if *simulation.realtime {
        let mut interval = tokio::time::interval(Duration::from_secs_f32(delta_time));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    session.step(delta_time);
                    if session.elapsed() >= duration {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted at {:.2}s", session.elapsed());
                    break;
                }
            }
        }
    } else {
        session.run_for(duration, delta_time);
    }

    for (index, id) in session.creatures().iter().enumerate() {
        tracing::info!("Creature {} states per node: {:?}", id, session.states(index));
    }
    tracing::info!(
        "Simulation finished at {:.2}s: converged={}, deliveries={}, unapplied stimuli={}",
        session.elapsed(),
        session.converged(),
        session.deliveries(),
        session.pending_stimuli()
    );

    Ok(())
}
