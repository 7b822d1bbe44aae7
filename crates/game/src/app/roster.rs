use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::CharacterDescriptor;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub(crate) const ROSTER_FILE: &str = "roster.json";
const ROSTER_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub(crate) enum RosterError {
    #[error("failed to read roster {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse roster {path} at {location}: {source}")]
    Parse {
        path: PathBuf,
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("roster {path} failed validation at {location}: {message}")]
    Invalid {
        path: PathBuf,
        location: String,
        message: String,
    },
}

/// Tunables for one fighter. Missing fields in the roster file fall back to these defaults.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FighterStats {
    pub width: f32,
    pub height: f32,
    pub move_speed: f32,
    pub jump_velocity: f32,
    pub max_health: u32,
    pub attack_reach: f32,
    pub attack_frames: u32,
    pub attack_cooldown_frames: u32,
}

impl Default for FighterStats {
    fn default() -> Self {
        Self {
            width: 60.0,
            height: 120.0,
            move_speed: 5.0,
            jump_velocity: 15.0,
            max_health: 100,
            attack_reach: 45.0,
            attack_frames: 10,
            attack_cooldown_frames: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RosterEntry {
    pub name: String,
    /// Asset folder, relative to the characters directory.
    pub folder: PathBuf,
    pub color: [u8; 3],
    #[serde(default)]
    pub stats: FighterStats,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RosterFile {
    roster_version: u32,
    characters: Vec<RosterEntry>,
}

/// Selectable characters, in menu order. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Roster {
    characters_dir: PathBuf,
    entries: Vec<RosterEntry>,
}

impl Roster {
    /// Reads `roster.json` from `characters_dir`, or falls back to the built-in roster when
    /// the file does not exist.
    pub(crate) fn load(characters_dir: &Path) -> Result<Self, RosterError> {
        let path = characters_dir.join(ROSTER_FILE);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "roster_file_missing_using_builtin");
                return Ok(Self::builtin(characters_dir));
            }
            Err(source) => return Err(RosterError::Read { path, source }),
        };
        let roster = Self::parse(characters_dir, &path, &raw)?;
        info!(
            path = %path.display(),
            character_count = roster.len(),
            "roster_loaded"
        );
        Ok(roster)
    }

    pub(crate) fn builtin(characters_dir: &Path) -> Self {
        let entry = |name: &str, folder: &str, color: [u8; 3], stats: FighterStats| RosterEntry {
            name: name.to_string(),
            folder: PathBuf::from(folder),
            color,
            stats,
        };
        let base = FighterStats::default();
        Self {
            characters_dir: characters_dir.to_path_buf(),
            entries: vec![
                entry("Fighter", "Fighter", [200, 64, 52], base),
                entry(
                    "Shinobi",
                    "Shinobi",
                    [70, 80, 160],
                    FighterStats {
                        move_speed: 6.5,
                        jump_velocity: 17.0,
                        max_health: 85,
                        attack_reach: 38.0,
                        attack_frames: 8,
                        attack_cooldown_frames: 14,
                        ..base
                    },
                ),
                entry(
                    "Archer",
                    "Archer",
                    [64, 150, 72],
                    FighterStats {
                        move_speed: 4.5,
                        max_health: 90,
                        attack_reach: 90.0,
                        attack_frames: 6,
                        attack_cooldown_frames: 30,
                        ..base
                    },
                ),
            ],
        }
    }

    fn parse(characters_dir: &Path, path: &Path, raw: &str) -> Result<Self, RosterError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let file: RosterFile =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
                let location = error.path().to_string();
                RosterError::Parse {
                    path: path.to_path_buf(),
                    location,
                    source: error.into_inner(),
                }
            })?;
        validate(path, &file)?;
        Ok(Self {
            characters_dir: characters_dir.to_path_buf(),
            entries: file.characters,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub(crate) fn get(&self, index: usize) -> Option<&RosterEntry> {
        self.entries.get(index)
    }

    pub(crate) fn find(&self, name: &str) -> Option<&RosterEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub(crate) fn descriptor(&self, entry: &RosterEntry) -> CharacterDescriptor {
        CharacterDescriptor {
            name: entry.name.clone(),
            base_folder: self.characters_dir.join(&entry.folder),
        }
    }
}

fn validate(path: &Path, file: &RosterFile) -> Result<(), RosterError> {
    let invalid = |location: String, message: String| RosterError::Invalid {
        path: path.to_path_buf(),
        location,
        message,
    };

    if file.roster_version != ROSTER_VERSION {
        return Err(invalid(
            "roster_version".to_string(),
            format!("expected {ROSTER_VERSION}, got {}", file.roster_version),
        ));
    }
    if file.characters.is_empty() {
        return Err(invalid(
            "characters".to_string(),
            "at least one character is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for (index, entry) in file.characters.iter().enumerate() {
        let at = |field: &str| format!("characters[{index}].{field}");
        if entry.name.trim().is_empty() {
            return Err(invalid(at("name"), "must not be empty".to_string()));
        }
        if !seen.insert(entry.name.as_str()) {
            return Err(invalid(
                at("name"),
                format!("duplicate character '{}'", entry.name),
            ));
        }
        let stats = &entry.stats;
        for (field, value) in [
            ("stats.width", stats.width),
            ("stats.height", stats.height),
            ("stats.move_speed", stats.move_speed),
            ("stats.jump_velocity", stats.jump_velocity),
            ("stats.attack_reach", stats.attack_reach),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(
                    at(field),
                    format!("expected positive finite number, got {value}"),
                ));
            }
        }
        if stats.max_health == 0 {
            return Err(invalid(at("stats.max_health"), "must be at least 1".to_string()));
        }
        if stats.attack_frames == 0 {
            return Err(invalid(
                at("stats.attack_frames"),
                "must be at least 1".to_string(),
            ));
        }
    }
    Ok(())
}
