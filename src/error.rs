use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdsetError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Type misuse: {0}")]
    TypeMisuse(String),
    #[error("Parse error: {message}")]
    Parse { message: String, line: Option<usize> },
    #[error("Config error: {0}")]
    Config(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Data corruption: {message}")]
    DataCorruption { message: String },
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, IdsetError>;

// Helper conversions
impl From<rusqlite::Error> for IdsetError {
    fn from(e: rusqlite::Error) -> Self { Self::Persistence(e.to_string()) }
}
impl From<config::ConfigError> for IdsetError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<std::io::Error> for IdsetError {
    fn from(e: std::io::Error) -> Self { Self::Io(e.to_string()) }
}
impl From<serde_json::Error> for IdsetError {
    fn from(e: serde_json::Error) -> Self { Self::Serialization(e.to_string()) }
}
