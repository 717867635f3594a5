// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Music sequencer
//!
//! Parses a two-channel melody written in RON, converts it from beats to
//! milliseconds and plays it through a sound component. The audio output
//! only prints each tone, so the demo shows exactly when notes fire.

use sprite_engine::audio::{gen_music_sheet, parse_notes, AudioOutput, Sound, Tone};
use sprite_engine::config::EngineConfig;
use sprite_engine::ecs::components::SoundComponent;
use sprite_engine::ecs::{Entity, EntityId, GameState};
use sprite_engine::scheduler::{Game, GameLoop, LoopHandle};
use sprite_engine::stage::{HeadlessStage, Stage};
use sprite_engine::Result;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

const BEAT_MS: f64 = 150.0;

const MELODY: &str = r#"[
    (n: "C4", d: 1.0),
    (n: "E4", d: 1.0),
    (n: "G4", d: 1.0),
    (n: "C5", d: 1.0),
    (n: "G4", d: 1.0, p: 1.0),
    (n: "E4", d: 2.0),
    (n: "C3", d: 2.0, c: 1),
    (n: "G3", d: 2.0, c: 1),
    (n: "A3", d: 2.0, c: 1, s: 6.0),
    (n: "E4", d: 1.0, c: 2),
]"#;

const CONFIG: &str = r#"
[audio]
channels = ["square", "triangle"]
volume = 0.3
"#;

/// Prints tones with their offset from the first one
struct PrintOutput {
    origin: Instant,
    played: Cell<usize>,
}

impl AudioOutput for PrintOutput {
    fn play_tone(&self, tone: Tone) {
        self.played.set(self.played.get() + 1);
        println!(
            "  {:>6.0}ms  ch{} {:?}  {:>7.2}Hz  {:>4.0}ms  vol {:.1}",
            self.origin.elapsed().as_secs_f64() * 1000.0,
            tone.channel,
            tone.oscillator,
            tone.frequency,
            tone.duration_ms,
            tone.volume
        );
    }
}

struct Sequencer {
    state: GameState,
    handle: LoopHandle,
    player: EntityId,
}

impl Game for Sequencer {
    fn update(&mut self, delta_ms: f64) -> Result<()> {
        self.state.update(delta_ms)?;
        let pending = self
            .state
            .entity(self.player)
            .and_then(|e| e.component::<SoundComponent>())
            .map(|s| s.pending())
            .unwrap_or(0);
        if pending == 0 {
            self.handle.stop();
        }
        Ok(())
    }

    fn render(&mut self, delta_ms: f64) -> Result<()> {
        self.state.render(delta_ms)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    println!("Sprite Engine - Sequencer");
    println!("=========================\n");

    let config = EngineConfig::from_toml_str(CONFIG)?;
    config.validate()?;

    let output = Rc::new(PrintOutput {
        origin: Instant::now(),
        played: Cell::new(0),
    });
    let sound = Sound::from_config(output.clone(), &config.audio);

    let notes = parse_notes(MELODY)?;
    let sheet = gen_music_sheet(BEAT_MS, &notes);
    println!(
        "{} notes over {} channels, {}ms per beat (channel 2 and C5 are deliberately unplayable)\n",
        sheet.len(),
        sound.channel_count(),
        BEAT_MS
    );

    let stage: Rc<dyn Stage> = Rc::new(HeadlessStage::from_config(&config.stage));
    let mut state = GameState::new(stage.clone());
    let mut speaker = SoundComponent::new(sound).with_volume(config.audio.volume);
    speaker.play(&sheet);
    let player = state.add_entity(Entity::builder(stage.clone()).with(speaker).build()?);

    let mut game_loop = GameLoop::new(stage, config.game_loop.clone())?;
    let mut game = Sequencer {
        state,
        handle: game_loop.handle(),
        player,
    };
    let stats = game_loop.run(&mut game)?;

    println!("\nPlayed {} tones in {} updates", output.played.get(), stats.updates);
    Ok(())
}
