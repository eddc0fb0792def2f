use std::collections::HashMap;

use crate::{CardError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Yes,
    Cute,
}

/// Independent playback slots. Loading a new source into a channel replaces
/// whatever it held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Background,
    Cue(Cue),
}

/// Playback collaborator. Starting playback may fail (blocked autoplay);
/// everything else is infallible.
pub trait AudioBackend {
    fn load(&mut self, channel: Channel, source: &str);
    fn play(&mut self, channel: Channel) -> Result<()>;
    fn pause(&mut self, channel: Channel);
    fn is_paused(&self, channel: Channel) -> bool;
}

/// Audio façade owned by the presentation. Only the background channel is
/// user controllable; cues are fire-and-forget.
#[derive(Debug)]
pub struct AudioEngine<B> {
    backend: B,
    song: Option<String>,
    cues: HashMap<Cue, String>,
}

impl<B: AudioBackend> AudioEngine<B> {
    pub fn new(backend: B, yes_cue: impl Into<String>, cute_cue: impl Into<String>) -> Self {
        let mut cues = HashMap::new();
        cues.insert(Cue::Yes, yes_cue.into());
        cues.insert(Cue::Cute, cute_cue.into());
        Self {
            backend,
            song: None,
            cues,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn song(&self) -> Option<&str> {
        self.song.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        !self.backend.is_paused(Channel::Background)
    }

    /// Replaces the background source and starts it. The source stays loaded
    /// even when playback is rejected.
    pub fn play_song(&mut self, source: &str) -> Result<()> {
        self.backend.pause(Channel::Background);
        self.backend.load(Channel::Background, source);
        self.song = Some(source.to_string());
        self.backend.play(Channel::Background)
    }

    /// Flips the background channel. Returns whether music is now playing.
    pub fn toggle(&mut self) -> bool {
        if self.backend.is_paused(Channel::Background) {
            if let Err(err) = self.backend.play(Channel::Background) {
                tracing::warn!(%err, "could not resume music");
            }
        } else {
            self.backend.pause(Channel::Background);
        }
        self.is_playing()
    }

    pub fn pause_background(&mut self) {
        self.backend.pause(Channel::Background);
    }

    /// Plays a one-shot cue, ignoring any failure.
    pub fn play_cue(&mut self, cue: Cue) {
        let Some(source) = self.cues.get(&cue) else {
            return;
        };
        let channel = Channel::Cue(cue);
        self.backend.load(channel, source);
        if let Err(err) = self.backend.play(channel) {
            tracing::warn!(?cue, %err, "cue playback failed");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    Loaded(Channel, String),
    Played(Channel),
    Rejected(Channel),
    Paused(Channel),
}

#[derive(Debug, Default)]
struct ChannelState {
    source: Option<String>,
    playing: bool,
}

/// Backend that produces no sound and records every call. With
/// `reject_playback` set it behaves like a browser blocking autoplay.
#[derive(Debug, Default)]
pub struct SilentBackend {
    reject_playback: bool,
    channels: HashMap<Channel, ChannelState>,
    events: Vec<AudioEvent>,
}

impl SilentBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            reject_playback: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> &[AudioEvent] {
        &self.events
    }

    pub fn source(&self, channel: Channel) -> Option<&str> {
        self.channels.get(&channel).and_then(|state| state.source.as_deref())
    }
}

impl AudioBackend for SilentBackend {
    fn load(&mut self, channel: Channel, source: &str) {
        let state = self.channels.entry(channel).or_default();
        state.source = Some(source.to_string());
        state.playing = false;
        self.events.push(AudioEvent::Loaded(channel, source.to_string()));
    }

    fn play(&mut self, channel: Channel) -> Result<()> {
        let state = self.channels.entry(channel).or_default();
        if state.source.is_none() {
            return Err(CardError::Playback(format!("{channel:?} has no source")));
        }
        if self.reject_playback {
            self.events.push(AudioEvent::Rejected(channel));
            return Err(CardError::Playback("autoplay blocked".to_string()));
        }
        state.playing = true;
        self.events.push(AudioEvent::Played(channel));
        Ok(())
    }

    fn pause(&mut self, channel: Channel) {
        if let Some(state) = self.channels.get_mut(&channel) {
            if state.playing {
                state.playing = false;
                self.events.push(AudioEvent::Paused(channel));
            }
        }
    }

    fn is_paused(&self, channel: Channel) -> bool {
        self.channels.get(&channel).map(|state| !state.playing).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(backend: SilentBackend) -> AudioEngine<SilentBackend> {
        AudioEngine::new(backend, "yes.mp3", "cute.mp3")
    }

    #[test]
    fn switching_songs_replaces_the_source() {
        let mut audio = engine(SilentBackend::new());
        audio.play_song("a.mp3").unwrap();
        audio.play_song("b.mp3").unwrap();

        assert_eq!(audio.song(), Some("b.mp3"));
        assert_eq!(audio.backend().source(Channel::Background), Some("b.mp3"));
        assert!(audio.backend().events().contains(&AudioEvent::Paused(Channel::Background)));
        assert!(audio.is_playing());
    }

    #[test]
    fn toggle_flips_background_state() {
        let mut audio = engine(SilentBackend::new());
        audio.play_song("a.mp3").unwrap();

        assert!(!audio.toggle());
        assert!(audio.toggle());
    }

    #[test]
    fn rejected_playback_reports_but_keeps_source() {
        let mut audio = engine(SilentBackend::rejecting());
        let err = audio.play_song("a.mp3").unwrap_err();
        assert!(matches!(err, CardError::Playback(_)));
        assert_eq!(audio.song(), Some("a.mp3"));
        assert!(!audio.is_playing());

        // Cues swallow the same failure.
        audio.play_cue(Cue::Yes);
        assert!(audio
            .backend()
            .events()
            .contains(&AudioEvent::Rejected(Channel::Cue(Cue::Yes))));
    }
}
