//! Layered settings: defaults, then an optional TOML file, then command-line flags.

use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::Args;
use math_snake_core::{ConfigViolation, GridSize, SessionConfig};
use math_snake_system_quiz::{QuizConfig, QuizConfigViolation};
use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating settings.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid [session] settings: {0}")]
    Session(#[from] ConfigViolation),

    #[error("invalid [quiz] settings: {0}")]
    Quiz(#[from] QuizConfigViolation),
}

/// Settings read from the TOML file, one table per engine component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) session: SessionConfig,
    pub(crate) quiz: QuizConfig,
}

impl Settings {
    /// Reads settings from `path`; missing tables and keys keep their defaults.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks both tables.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        self.session.validate()?;
        self.quiz.validate()?;
        Ok(())
    }
}

/// Command-line flags that take precedence over the config file.
#[derive(Args, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Overrides {
    /// Side length of the square grid.
    #[arg(long)]
    pub(crate) grid_size: Option<u32>,
    /// Tick period when a session starts, in milliseconds.
    #[arg(long)]
    pub(crate) initial_period_ms: Option<u64>,
    /// Period reduction after each correct answer, in milliseconds.
    #[arg(long)]
    pub(crate) speed_step_ms: Option<u64>,
    /// Lower bound for the tick period, in milliseconds.
    #[arg(long)]
    pub(crate) min_period_ms: Option<u64>,
    /// Targets per round, the correct answer included.
    #[arg(long = "targets")]
    pub(crate) target_count: Option<usize>,
    /// Difficulty tier of generated problems.
    #[arg(long)]
    pub(crate) tier: Option<u8>,
    /// Keep targets off the snake's body.
    #[arg(long)]
    pub(crate) avoid_actor: bool,
}

impl Overrides {
    /// Writes every provided flag into `settings`.
    pub(crate) fn apply(&self, settings: &mut Settings) {
        if let Some(size) = self.grid_size {
            settings.session.grid_size = GridSize::new(size);
        }
        if let Some(ms) = self.initial_period_ms {
            settings.session.initial_period_ms = ms;
        }
        if let Some(ms) = self.speed_step_ms {
            settings.session.speed_step_ms = ms;
        }
        if let Some(ms) = self.min_period_ms {
            settings.session.min_period_ms = ms;
        }
        if let Some(count) = self.target_count {
            settings.quiz.target_count = count;
        }
        if let Some(tier) = self.tier {
            settings.quiz.difficulty_tier = tier;
        }
        if self.avoid_actor {
            settings.quiz.avoid_actor = true;
        }
    }
}

/// Builds the validated settings for this run.
pub(crate) fn resolve(
    path: Option<&Path>,
    overrides: &Overrides,
) -> Result<Settings, ConfigError> {
    let mut settings = match path {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    overrides.apply(&mut settings);
    settings.validate()?;
    Ok(settings)
}
