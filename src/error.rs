use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThresholdError {
    #[error("'{0}' is not an integer")]
    NotAnInteger(String),

    #[error("{0} is outside of 0-100")]
    OutOfRange(i64),
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("unexpected {command} output: {line}")]
    Parse { command: String, line: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Yaml(#[from] yaml_rust::ScanError),

    #[error("config file is empty")]
    Empty,

    #[error("{0} should be a hashmap")]
    NotAHash(String),

    #[error("{0} should be an array")]
    NotAnArray(String),

    #[error("{section}: missing '{key}'")]
    MissingKey { section: String, key: String },

    #[error("{section}: '{key}' has an unsupported value")]
    InvalidValue { section: String, key: String },

    #[error("{0}: unknown check type '{1}'")]
    UnknownCheck(String, String),

    #[error("unknown output '{0}'")]
    UnknownOutput(String),
}
