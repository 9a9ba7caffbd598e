use std::path::PathBuf;
use thiserror::Error;

/// Failures outside the generation pass itself: loading sources and writing output.
///
/// Candidates that cannot be mapped are never errors; they simply produce no unit.
#[derive(Debug, Error)]
pub enum Error {
  #[error("Failed to read `{}`: {source}", .path.display())]
  Read {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("Failed to write `{}`: {source}", .path.display())]
  Write {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("Failed to parse `{}`: {source}", .path.display())]
  Parse {
    path: PathBuf,
    source: syn::Error,
  },
  #[error("Invalid module path `{0}`")]
  InvalidModulePath(String),
  #[error("Module `{name}` not found, tried: {candidates:?}")]
  ModuleNotFound {
    name: String,
    candidates: Vec<PathBuf>,
  },
  #[error("No crate root found in `{}`", .0.display())]
  NoCrateRoot(PathBuf),
  #[error("Environment variable `{0}` is not set")]
  MissingEnv(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
