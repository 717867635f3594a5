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
//! Audio collaborator interface and music sheets
//!
//! The engine does no synthesis. [`Sound`] owns a fixed list of channels, each
//! with an oscillator shape, and forwards notes to an [`AudioOutput`]
//! supplied by the host. Missing channels and unknown note names are logged
//! and skipped rather than reported as errors.

use crate::config::{AudioConfig, ConfigError};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Oscillator waveform of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Oscillator {
    /// Sine wave
    #[default]
    Sine,
    /// Square wave
    Square,
    /// Sawtooth wave
    Sawtooth,
    /// Triangle wave
    Triangle,
}

/// A single note handed to the host for playback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Channel index
    pub channel: usize,
    /// Waveform of that channel
    pub oscillator: Oscillator,
    /// Frequency in hertz
    pub frequency: f64,
    /// Length of the note
    pub duration_ms: f64,
    /// Gain in `[0, 1]`
    pub volume: f64,
}

/// Host audio backend
pub trait AudioOutput {
    /// Start a tone immediately; the backend stops it after its duration
    fn play_tone(&self, tone: Tone);
}

/// Default note length when none is given
pub const DEFAULT_NOTE_DURATION_MS: f64 = 50.0;

/// Default note volume when none is given
pub const DEFAULT_NOTE_VOLUME: f64 = 0.2;

/// Fixed set of sound channels feeding one output
pub struct Sound {
    output: Rc<dyn AudioOutput>,
    channels: Vec<Oscillator>,
}

impl Sound {
    /// Create a sound with one channel per oscillator entry
    pub fn new(output: Rc<dyn AudioOutput>, channels: Vec<Oscillator>) -> Self {
        Sound { output, channels }
    }

    /// Create `count` sine channels
    pub fn with_channel_count(output: Rc<dyn AudioOutput>, count: usize) -> Self {
        Self::new(output, vec![Oscillator::Sine; count])
    }

    /// Create channels as laid out in configuration
    pub fn from_config(output: Rc<dyn AudioOutput>, config: &AudioConfig) -> Self {
        Self::new(output, config.channels.clone())
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Play a note on a channel
    ///
    /// Returns `false` (after logging a warning) when the channel does not
    /// exist.
    pub fn play_note(&self, channel: usize, frequency: f64, duration_ms: f64, volume: f64) -> bool {
        let Some(&oscillator) = self.channels.get(channel) else {
            log::warn!("Channel {} not found", channel);
            return false;
        };

        self.output.play_tone(Tone {
            channel,
            oscillator,
            frequency,
            duration_ms,
            volume,
        });
        true
    }

    /// Play a short blip: [`play_note`](Self::play_note) with
    /// [`DEFAULT_NOTE_DURATION_MS`] and [`DEFAULT_NOTE_VOLUME`]
    pub fn play_sound(&self, channel: usize, frequency: f64) -> bool {
        self.play_note(channel, frequency, DEFAULT_NOTE_DURATION_MS, DEFAULT_NOTE_VOLUME)
    }
}

const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

const OCTAVE_3: [f64; 12] = [
    130.81, 138.59, 146.83, 155.56, 164.81, 174.61, 185.0, 196.0, 207.65, 220.0, 233.08, 246.94,
];

const OCTAVE_4: [f64; 12] = [
    261.63, 277.18, 293.66, 311.13, 329.63, 349.23, 369.99, 392.0, 415.3, 440.0, 466.16, 493.88,
];

/// Look up the frequency of a note name such as `"A4"`, `"C#3"` or `"E"`
///
/// Bare names refer to octave 4. Only octaves 3 and 4 are tabulated.
pub fn note_frequency(name: &str) -> Option<f64> {
    let (pitch, octave) = match name.char_indices().find(|(_, c)| c.is_ascii_digit()) {
        Some((split, _)) => (&name[..split], name[split..].parse::<u8>().ok()?),
        None => (name, 4),
    };

    let index = NOTE_NAMES.iter().position(|n| *n == pitch)?;
    match octave {
        3 => Some(OCTAVE_3[index]),
        4 => Some(OCTAVE_4[index]),
        _ => None,
    }
}

/// Frequency of a note, or `0.0` with a logged warning when unknown
pub fn note_to_tone(name: &str) -> f64 {
    note_frequency(name).unwrap_or_else(|| {
        log::warn!("Note {} not found", name);
        0.0
    })
}

/// One note of a piece of music
///
/// Times are in beats before [`gen_music_sheet`] and milliseconds after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteData {
    /// Note name
    #[serde(rename = "n")]
    pub note: String,
    /// Duration
    #[serde(rename = "d")]
    pub duration: f64,
    /// Silence after the note
    #[serde(rename = "p", default)]
    pub pause: f64,
    /// Channel index
    #[serde(rename = "c", default)]
    pub channel: usize,
    /// Explicit start offset; zero means "right after the previous note"
    #[serde(rename = "s", default)]
    pub start: f64,
}

impl NoteData {
    /// A note with no pause on channel 0
    pub fn new(note: impl Into<String>, duration: f64) -> Self {
        NoteData {
            note: note.into(),
            duration,
            pause: 0.0,
            channel: 0,
            start: 0.0,
        }
    }

    /// Set the pause after the note
    pub fn with_pause(mut self, pause: f64) -> Self {
        self.pause = pause;
        self
    }

    /// Set the channel
    pub fn on_channel(mut self, channel: usize) -> Self {
        self.channel = channel;
        self
    }

    /// Set an explicit start offset
    pub fn starting_at(mut self, start: f64) -> Self {
        self.start = start;
        self
    }
}

/// Notes with every time expressed in milliseconds
pub type MusicSheet = Vec<NoteData>;

/// Convert beat-relative notes into a millisecond music sheet
pub fn gen_music_sheet(beat_ms: f64, music: &[NoteData]) -> MusicSheet {
    music
        .iter()
        .map(|n| NoteData {
            note: n.note.clone(),
            duration: n.duration * beat_ms,
            pause: n.pause * beat_ms,
            channel: n.channel,
            start: n.start * beat_ms,
        })
        .collect()
}

/// Parse a RON list of notes, e.g. `[(n: "C4", d: 1.0), (n: "E4", d: 1.0, p: 0.5)]`
pub fn parse_notes(source: &str) -> Result<Vec<NoteData>, ConfigError> {
    ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// A note resolved to a channel, frequency and absolute start offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledNote {
    /// Offset from the start of playback
    pub at_ms: f64,
    /// Channel index
    pub channel: usize,
    /// Frequency in hertz (zero for unknown notes)
    pub frequency: f64,
    /// Length of the note
    pub duration_ms: f64,
}

/// Lay out a music sheet on a timeline
///
/// Notes are grouped by channel in order of first appearance. Within a
/// channel a running time starts at the first note's start offset; each note
/// starts at its own non-zero offset or at the running time, and the running
/// time advances by duration plus pause.
pub fn schedule(sheet: &[NoteData]) -> Vec<ScheduledNote> {
    let mut channels: Vec<usize> = Vec::new();
    for note in sheet {
        if !channels.contains(&note.channel) {
            channels.push(note.channel);
        }
    }

    let mut scheduled = Vec::with_capacity(sheet.len());
    for channel in channels {
        let mut notes = sheet.iter().filter(|n| n.channel == channel).peekable();
        let mut t = notes.peek().map(|n| n.start).unwrap_or(0.0);

        for note in notes {
            let at_ms = if note.start != 0.0 { note.start } else { t };
            t += note.duration + note.pause;
            scheduled.push(ScheduledNote {
                at_ms,
                channel,
                frequency: note_to_tone(&note.note),
                duration_ms: note.duration,
            });
        }
    }
    scheduled
}
