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
//! Music playback

use crate::audio::{schedule, NoteData, ScheduledNote, Sound};
use crate::ecs::{Component, ComponentKind, Entity, StateApi, TypedComponent};
use crate::error::Result;
use std::fmt;

/// Default playback volume
pub const DEFAULT_VOLUME: f64 = 0.5;

/// Plays music sheets through a [`Sound`]
///
/// [`play`](Self::play) lays the sheet out on a timeline relative to the
/// component's own elapsed update time; each update releases the notes whose
/// start offset has passed. Terminating the entity drops whatever is still
/// queued.
pub struct SoundComponent {
    sound: Sound,
    /// Volume applied to every note
    pub volume: f64,
    elapsed_ms: f64,
    queue: Vec<ScheduledNote>,
}

impl SoundComponent {
    /// Create a sound component at the default volume
    pub fn new(sound: Sound) -> Self {
        SoundComponent {
            sound,
            volume: DEFAULT_VOLUME,
            elapsed_ms: 0.0,
            queue: Vec::new(),
        }
    }

    /// Set the playback volume
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    /// Underlying channels
    pub fn sound(&self) -> &Sound {
        &self.sound
    }

    /// Queue a music sheet (times in milliseconds) starting now
    pub fn play(&mut self, sheet: &[NoteData]) {
        let now = self.elapsed_ms;
        self.queue.extend(schedule(sheet).into_iter().map(|mut note| {
            note.at_ms += now;
            note
        }));
        self.queue.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
    }

    /// Notes waiting to be played
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drop every queued note
    pub fn stop(&mut self) {
        self.queue.clear();
    }
}

impl Component for SoundComponent {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn on_update(&mut self, _entity: &mut Entity, delta_ms: f64, _state: Option<&mut StateApi>) -> Result<()> {
        self.elapsed_ms += delta_ms;
        let due = self.queue.partition_point(|note| note.at_ms <= self.elapsed_ms);
        for note in self.queue.drain(..due) {
            self.sound
                .play_note(note.channel, note.frequency, note.duration_ms, self.volume);
        }
        Ok(())
    }

    fn on_terminate(&mut self, _entity: &mut Entity) {
        if !self.queue.is_empty() {
            log::debug!("dropping {} queued notes", self.queue.len());
        }
        self.stop();
    }
}

impl TypedComponent for SoundComponent {
    const KIND: ComponentKind = ComponentKind::Sound;
}

impl fmt::Debug for SoundComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundComponent")
            .field("channels", &self.sound.channel_count())
            .field("volume", &self.volume)
            .field("pending", &self.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioOutput, Tone};
    use crate::stage::HeadlessStage;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        tones: RefCell<Vec<Tone>>,
    }

    impl AudioOutput for Recorder {
        fn play_tone(&self, tone: Tone) {
            self.tones.borrow_mut().push(tone);
        }
    }

    fn setup() -> (Rc<Recorder>, Entity) {
        let recorder = Rc::new(Recorder::default());
        let stage = Rc::new(HeadlessStage::new(800.0, 600.0));
        let entity = Entity::builder(stage)
            .with(SoundComponent::new(Sound::with_channel_count(recorder.clone(), 2)))
            .build()
            .unwrap();
        (recorder, entity)
    }

    #[test]
    fn test_notes_released_when_due() {
        let (recorder, mut entity) = setup();
        entity.component_mut::<SoundComponent>().unwrap().play(&[
            NoteData::new("C4", 100.0),
            NoteData::new("E4", 100.0),
            NoteData::new("A4", 200.0).on_channel(1),
        ]);

        entity.update(0.0, None).unwrap();
        assert_eq!(recorder.tones.borrow().len(), 2);

        entity.update(100.0, None).unwrap();
        let tones = recorder.tones.borrow();
        assert_eq!(tones.len(), 3);
        assert_eq!(tones[2].frequency, 329.63);
        assert_eq!(tones[2].volume, DEFAULT_VOLUME);
    }

    #[test]
    fn test_play_is_relative_to_now() {
        let (recorder, mut entity) = setup();
        entity.update(1000.0, None).unwrap();
        entity
            .component_mut::<SoundComponent>()
            .unwrap()
            .play(&[NoteData::new("C4", 50.0).starting_at(200.0)]);

        entity.update(100.0, None).unwrap();
        assert!(recorder.tones.borrow().is_empty());
        entity.update(100.0, None).unwrap();
        assert_eq!(recorder.tones.borrow().len(), 1);
    }

    #[test]
    fn test_terminate_drops_queue() {
        let (recorder, mut entity) = setup();
        entity
            .component_mut::<SoundComponent>()
            .unwrap()
            .play(&[NoteData::new("C4", 50.0).starting_at(500.0)]);

        entity.destroy();
        assert_eq!(entity.component::<SoundComponent>().unwrap().pending(), 0);
        assert!(recorder.tones.borrow().is_empty());
    }
}
