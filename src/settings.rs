//! Settings for the `idset` command, read from a TOML file with `IDSET__`
//! environment overrides (e.g. `IDSET__OPERATION__FILTER_VALUE=40`).

// config lets you read a separate config file
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::operate::Parameters;
use crate::persist::PersistenceMode;

pub const DEFAULT_FILE: &str = "idset.toml";
const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub log_filter: String,
    /// A SQLite file, or `:memory:`.
    pub database: String,
    #[serde(default)]
    pub import: ImportSettings,
    #[serde(default)]
    pub operation: Option<OperationSettings>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Dali report files, each stored as a set named after its subset.
    pub dali: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationSettings {
    /// Names of stored sets, in the order the operation takes them.
    pub inputs: Vec<String>,
    pub output: String,
    #[serde(default)]
    pub export: Option<String>,
    /// Read from the same `[operation]` table.
    #[serde(skip)]
    pub parameters: Parameters,
}

impl Settings {
    /// Loads settings from `path`, or from the default file when it exists.
    pub fn load(path: Option<&str>) -> Result<Settings> {
        let file = match path {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };
        // environment values stay strings; fields convert them to their own types
        let config = Config::builder()
            .set_default("log_filter", "info")?
            .set_default("database", "idset.db")?
            .add_source(file)
            .add_source(
                Environment::with_prefix("IDSET")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("import.dali")
                    .with_list_parse_key("operation.inputs"),
            )
            .build()?;
        let parameters = match config.get::<Parameters>("operation") {
            Ok(parameters) => parameters,
            Err(ConfigError::NotFound(_)) => Parameters::default(),
            Err(e) => return Err(e.into()),
        };
        let mut settings = config.try_deserialize::<Settings>()?;
        if let Some(operation) = settings.operation.as_mut() {
            operation.parameters = parameters;
        }
        Ok(settings)
    }
    pub fn persistence(&self) -> PersistenceMode {
        match self.database.as_str() {
            IN_MEMORY => PersistenceMode::InMemory,
            path => PersistenceMode::File(path.to_string()),
        }
    }
}
