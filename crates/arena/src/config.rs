//! Arena configuration.
//!
//! Loaded from TOML, then overridden from environment variables. With no
//! file at all, [`ArenaConfig::default`] stages a skirmisher squad against
//! a guardian squad.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Base seed; each agent's RNG is derived from it.
    pub seed: u64,
    /// Maximum number of ticks to simulate.
    pub ticks: u64,
    /// Ticks per simulated second.
    pub tick_rate: f32,
    pub aggro_radius: f32,
    /// Fraction of threat lost per second.
    pub threat_decay: f32,
    pub move_speed: f32,
    /// Directory of `*.ron` profiles. Built-in profiles when unset.
    pub profile_dir: Option<PathBuf>,
    /// Directory for the log file. Stderr only when unset.
    pub log_dir: Option<PathBuf>,
    pub teams: Vec<TeamConfig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TeamConfig {
    pub profile: String,
    pub size: usize,
    /// Center of the team's spawn line.
    pub spawn: [f32; 3],
    #[serde(default = "default_spacing")]
    pub spacing: f32,
    #[serde(default)]
    pub skills: Vec<SkillConfig>,
}

/// A skill and its effect. The harness resolves effects itself; the AI only
/// ever sees the name and cooldown.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SkillConfig {
    pub name: String,
    pub cooldown: f32,
    /// Fraction of the target's max health removed per use.
    #[serde(default)]
    pub damage: f32,
    /// Fraction of the caster's max health restored per use.
    #[serde(default)]
    pub heal: f32,
    /// Maximum distance to the target for damage to land.
    #[serde(default = "default_range")]
    pub range: f32,
}

fn default_spacing() -> f32 {
    2.0
}

fn default_range() -> f32 {
    2.5
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            ticks: 600,
            tick_rate: 10.0,
            aggro_radius: 20.0,
            threat_decay: 0.05,
            move_speed: 4.0,
            profile_dir: None,
            log_dir: None,
            teams: vec![
                TeamConfig {
                    profile: "skirmisher".into(),
                    size: 4,
                    spawn: [-8.0, 0.0, 0.0],
                    spacing: default_spacing(),
                    skills: vec![
                        SkillConfig::damage("Slash", 1.0, 0.08, 3.0),
                        SkillConfig::damage("Lunge", 4.0, 0.15, 3.0),
                        SkillConfig::damage("Bow", 2.0, 0.06, 20.0),
                        SkillConfig::heal("Bandage", 8.0, 0.2),
                        SkillConfig::utility("Parry", 5.0),
                    ],
                },
                TeamConfig {
                    profile: "guardian".into(),
                    size: 3,
                    spawn: [8.0, 0.0, 0.0],
                    spacing: default_spacing(),
                    skills: vec![
                        SkillConfig::damage("ShieldBash", 5.0, 0.1, 2.5),
                        SkillConfig::damage("Smite", 3.0, 0.12, 2.5),
                        SkillConfig::damage("Strike", 1.2, 0.07, 2.5),
                        SkillConfig::damage("Cleave", 2.0, 0.1, 3.0),
                        SkillConfig::utility("Taunt", 6.0),
                    ],
                },
            ],
        }
    }
}

impl SkillConfig {
    pub fn damage(name: &str, cooldown: f32, damage: f32, range: f32) -> Self {
        Self {
            name: name.into(),
            cooldown,
            damage,
            heal: 0.0,
            range,
        }
    }

    pub fn heal(name: &str, cooldown: f32, heal: f32) -> Self {
        Self {
            name: name.into(),
            cooldown,
            damage: 0.0,
            heal,
            range: default_range(),
        }
    }

    pub fn utility(name: &str, cooldown: f32) -> Self {
        Self {
            name: name.into(),
            cooldown,
            damage: 0.0,
            heal: 0.0,
            range: default_range(),
        }
    }
}

impl ArenaConfig {
    /// Reads a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        Self::from_toml_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides.
    ///
    /// Environment variables:
    /// - `ARENA_SEED` - Base RNG seed
    /// - `ARENA_TICKS` - Maximum ticks to simulate
    /// - `ARENA_TICK_RATE` - Ticks per second
    /// - `ARENA_TEAM_SIZE` - Size of every team
    /// - `ARENA_PROFILE` - Profile name used by every team
    /// - `ARENA_LOG_DIR` - Directory for the log file
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(seed) = read_env::<u64>("ARENA_SEED") {
            self.seed = seed;
        }
        if let Some(ticks) = read_env::<u64>("ARENA_TICKS") {
            self.ticks = ticks;
        }
        if let Some(rate) = read_env::<f32>("ARENA_TICK_RATE") {
            self.tick_rate = rate;
        }
        if let Some(size) = read_env::<usize>("ARENA_TEAM_SIZE") {
            for team in &mut self.teams {
                team.size = size;
            }
        }
        if let Some(profile) = read_env::<String>("ARENA_PROFILE") {
            for team in &mut self.teams {
                team.profile = profile.clone();
            }
        }
        if let Some(dir) = read_env::<PathBuf>("ARENA_LOG_DIR") {
            self.log_dir = Some(dir);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.tick_rate.is_finite() && self.tick_rate > 0.0,
            "tick_rate must be positive, got {}",
            self.tick_rate
        );
        anyhow::ensure!(self.teams.len() >= 2, "an arena needs at least two teams");
        for team in &self.teams {
            anyhow::ensure!(!team.profile.is_empty(), "team profile name is empty");
            for skill in &team.skills {
                anyhow::ensure!(
                    skill.cooldown >= 0.0,
                    "skill '{}' has a negative cooldown",
                    skill.name
                );
            }
        }
        Ok(())
    }

    /// Seconds per tick.
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
