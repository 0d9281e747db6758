use thiserror::Error;

#[derive(Error, Debug)]
pub enum CombatError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Deployment failed: {0}")]
    Deployment(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CombatError>;
