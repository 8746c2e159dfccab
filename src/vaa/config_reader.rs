use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use party_matching::Language;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::args::{Args, SimulationArgs};
use crate::vaa::{OpeningJsonSnafu, ParsingJsonSnafu, VaaResult};

pub const DEFAULT_DATABASE: &str = "data/database.json";
pub const DEFAULT_LEVEL: &str = "base";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "data";

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub seed: Option<u64>,
    pub trials: Option<usize>,
    pub changes: Option<usize>,
    pub folds: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaaConfig {
    pub database: Option<String>,
    pub levels: Option<Vec<String>>,
    pub language: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    pub simulation: Option<SimulationSettings>,
}

/// The settings of a run, once the configuration file and the command line are merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub database: String,
    pub levels: Vec<String>,
    pub language: Language,
    pub output_directory: String,
}

impl RunSettings {
    /// The prefix of the generated tables, for example `base_french`.
    pub fn table_prefix(&self) -> String {
        format!("{}_{}", self.levels.join("_"), self.language.name())
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct SimulationParams {
    pub seed: u64,
    pub trials: usize,
    pub changes: usize,
    pub folds: usize,
}

impl SimulationParams {
    pub const DEFAULT_PARAMS: SimulationParams = SimulationParams {
        seed: 543210,
        trials: 10000,
        changes: 2,
        folds: 10,
    };
}

pub fn read_config(path: &str) -> VaaResult<VaaConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: VaaConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    info!("config: {:?}", config);
    Ok(config)
}

/// Reads the configuration file (if any) and applies the command line on top of it.
pub fn resolve_settings(args: &Args) -> VaaResult<(RunSettings, Option<VaaConfig>)> {
    let config = match args.config.as_deref() {
        Some(p) => Some(read_config(p)?),
        None => None,
    };
    let root = args.config.as_deref().and_then(|p| Path::new(p).parent());
    let settings = merge_settings(args, config.as_ref(), root)?;
    debug!("resolve_settings: {:?}", settings);
    Ok((settings, config))
}

pub fn merge_settings(
    args: &Args,
    config: Option<&VaaConfig>,
    config_root: Option<&Path>,
) -> VaaResult<RunSettings> {
    // Paths from the configuration file are relative to the file.
    let from_config = |p: &Option<String>| -> Option<String> {
        p.as_ref().map(|s| match config_root {
            Some(root) => {
                let full: PathBuf = root.join(s);
                full.display().to_string()
            }
            None => s.clone(),
        })
    };

    let database = args
        .database
        .clone()
        .or_else(|| config.and_then(|c| from_config(&c.database)))
        .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

    let levels = if !args.levels.is_empty() {
        args.levels.clone()
    } else {
        config
            .and_then(|c| c.levels.clone())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_LEVEL.to_string()])
    };

    let language_s = args
        .language
        .clone()
        .or_else(|| config.and_then(|c| c.language.clone()));
    let language = match language_s {
        Some(s) => match s.parse::<Language>() {
            Ok(l) => l,
            Err(msg) => whatever!("{}", msg),
        },
        None => Language::French,
    };

    let output_directory = config
        .and_then(|c| from_config(&c.output_directory))
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIRECTORY.to_string());

    Ok(RunSettings {
        database,
        levels,
        language,
        output_directory,
    })
}

pub fn merge_simulation(config: Option<&VaaConfig>, cli: &SimulationArgs) -> SimulationParams {
    let file = config
        .and_then(|c| c.simulation.clone())
        .unwrap_or_default();
    let d = SimulationParams::DEFAULT_PARAMS;
    SimulationParams {
        seed: cli.seed.or(file.seed).unwrap_or(d.seed),
        trials: cli.trials.or(file.trials).unwrap_or(d.trials),
        changes: cli.changes.or(file.changes).unwrap_or(d.changes),
        folds: cli.folds.or(file.folds).unwrap_or(d.folds),
    }
}
