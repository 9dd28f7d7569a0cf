use std::path::PathBuf;

use thiserror::Error;

/// Invalid particle population parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("display {width}x{height} is too small: need width > 40 and height > 70")]
    DisplayTooSmall { width: u32, height: u32 },

    #[error("particle count must be positive")]
    EmptyPopulation,
}

/// Shader program load failure (read, compile, or link).
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to compile {stage} shader:\n{message}")]
    Compile { stage: &'static str, message: String },

    #[error("failed to link shader program: {0}")]
    Link(String),
}

/// Fatal error while bringing up the particle renderer.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error("shader program has no uniform named `{0}`")]
    MissingUniform(&'static str),

    #[error("shader program has no vertex attribute named `{0}`")]
    MissingAttribute(&'static str),
}
