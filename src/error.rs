use miette::Diagnostic;
use thiserror::Error;

/// Main error type for tilecut operations
#[derive(Error, Diagnostic, Debug)]
pub enum TilecutError {
    #[error("IO error: {0}")]
    #[diagnostic(code(tilecut::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(tilecut::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("File '{}' not found", .path.display())]
    #[diagnostic(
        code(tilecut::not_found),
        help("Check the path to the source map image")
    )]
    NotFound { path: std::path::PathBuf },

    #[error("File '{}' failed to load: {message}", .path.display())]
    #[diagnostic(code(tilecut::decode))]
    Decode {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(tilecut::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Allocation error: {message}")]
    #[diagnostic(code(tilecut::alloc), help("Try a smaller tile count or tile size"))]
    Allocation { message: String },
}

pub type Result<T> = std::result::Result<T, TilecutError>;
