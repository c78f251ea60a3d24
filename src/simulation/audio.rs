//! Audio playback collaborators
//!
//! The engine only decides which clip to play and when. Players report how
//! long the clip lasts so the announcement queue can wait for it; a player
//! that fails returns an error and the caller treats it as a zero-length clip.

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which clip library a cue comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCategory {
    /// Gongs, door sounds and fixed phrases
    System,
    /// Stop names
    Stop,
}

impl AudioCategory {
    fn dir_name(self) -> &'static str {
        match self {
            AudioCategory::System => "sys",
            AudioCategory::Stop => "stops",
        }
    }
}

/// A single clip to play
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnnouncementCue {
    pub category: AudioCategory,
    pub key: String,
}

impl AnnouncementCue {
    pub fn system(key: impl Into<String>) -> Self {
        Self {
            category: AudioCategory::System,
            key: key.into(),
        }
    }

    pub fn stop(key: impl Into<String>) -> Self {
        Self {
            category: AudioCategory::Stop,
            key: key.into(),
        }
    }
}

impl fmt::Display for AnnouncementCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category.dir_name(), self.key)
    }
}

/// Plays cues and reports their length in seconds
pub trait AudioPlayer {
    fn play(&mut self, cue: &AnnouncementCue) -> Result<f64>;
}

/// Play a cue, logging failures and treating them as zero-length clips
pub fn play_or_silence(player: &mut dyn AudioPlayer, cue: &AnnouncementCue) -> f64 {
    match player.play(cue) {
        Ok(duration) if duration.is_finite() && duration >= 0.0 => duration,
        Ok(duration) => {
            warn!("Player reported invalid duration {} for {}", duration, cue);
            0.0
        }
        Err(e) => {
            warn!("Could not play {}: {:#}", cue, e);
            0.0
        }
    }
}

/// Plays nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPlayer;

impl AudioPlayer for SilentPlayer {
    fn play(&mut self, _cue: &AnnouncementCue) -> Result<f64> {
        Ok(0.0)
    }
}

/// Fixed clip lengths per key; remembers everything it was asked to play
#[derive(Debug, Clone, Default)]
pub struct ScriptedPlayer {
    durations: HashMap<String, f64>,
    default_duration: f64,
    pub played: Vec<AnnouncementCue>,
}

impl ScriptedPlayer {
    pub fn new(default_duration: f64) -> Self {
        Self {
            durations: HashMap::new(),
            default_duration,
            played: Vec::new(),
        }
    }

    pub fn with_duration(mut self, key: impl Into<String>, duration: f64) -> Self {
        self.durations.insert(key.into(), duration);
        self
    }

    pub fn played_keys(&self) -> Vec<&str> {
        self.played.iter().map(|cue| cue.key.as_str()).collect()
    }
}

impl AudioPlayer for ScriptedPlayer {
    fn play(&mut self, cue: &AnnouncementCue) -> Result<f64> {
        self.played.push(cue.clone());
        Ok(self
            .durations
            .get(&cue.key)
            .copied()
            .unwrap_or(self.default_duration))
    }
}

/// Resolves clips under `<root>/sys` and `<root>/stops`
///
/// No decoding happens here. Durations come from an optional
/// `durations.json` manifest in the root (`{"sys/gong": 1.4, ...}`),
/// otherwise every found clip is assumed to last `default_duration`.
#[derive(Debug, Clone)]
pub struct CatalogPlayer {
    root: PathBuf,
    durations: HashMap<String, f64>,
    default_duration: f64,
}

impl CatalogPlayer {
    pub const MANIFEST: &'static str = "durations.json";

    pub fn new(root: impl Into<PathBuf>, default_duration: f64) -> Self {
        let root = root.into();
        let durations = match Self::load_manifest(&root) {
            Ok(durations) => durations,
            Err(e) => {
                debug!("No clip duration manifest: {:#}", e);
                HashMap::new()
            }
        };
        Self {
            root,
            durations,
            default_duration,
        }
    }

    fn load_manifest(root: &Path) -> Result<HashMap<String, f64>> {
        let path = root.join(Self::MANIFEST);
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("Invalid {}", path.display()))
    }

    /// Path of the clip for `cue`, preferring mp3 over wav
    pub fn resolve(&self, cue: &AnnouncementCue) -> Option<PathBuf> {
        if cue.key.is_empty() {
            return None;
        }
        let dir = self.root.join(cue.category.dir_name());
        ["mp3", "wav"]
            .iter()
            .map(|ext| dir.join(format!("{}.{}", cue.key, ext)))
            .find(|path| path.is_file())
    }
}

impl AudioPlayer for CatalogPlayer {
    fn play(&mut self, cue: &AnnouncementCue) -> Result<f64> {
        let Some(path) = self.resolve(cue) else {
            bail!("Clip {} not found under {}", cue, self.root.display());
        };
        let duration = self
            .durations
            .get(&cue.to_string())
            .copied()
            .unwrap_or(self.default_duration);
        info!("♪ {} ({:.1}s) {}", cue, duration, path.display());
        Ok(duration)
    }
}
