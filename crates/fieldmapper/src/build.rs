//! Entry point for Cargo build scripts.
//!
//! ```no_run
//! // build.rs
//! fn main() -> Result<(), fieldmapper::Error> {
//!   fieldmapper::build::generate()?;
//!   Ok(())
//! }
//! ```
//!
//! ```ignore
//! // src/lib.rs
//! include!(concat!(env!("OUT_DIR"), "/fieldmapper.rs"));
//! ```

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::GeneratedUnits;
use crate::pipeline::Generator;
use crate::program::Program;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Log filter for the generator, e.g. `FIELDMAPPER_LOG=fieldmapper=debug`.
pub const LOG_ENV: &str = "FIELDMAPPER_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Generates mappers for the crate whose build script is running.
pub fn generate() -> Result<GeneratedUnits> {
  Builder::from_env()?.generate()
}

#[derive(Debug, Clone)]
pub struct Builder {
  root: PathBuf,
  out_dir: PathBuf,
  config: Config,
}

impl Builder {
  pub fn new(root: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      out_dir: out_dir.into(),
      config: Config::default(),
    }
  }

  /// Uses `CARGO_MANIFEST_DIR` to find `src/lib.rs` (or `src/main.rs`) and
  /// writes into `OUT_DIR`.
  pub fn from_env() -> Result<Self> {
    let manifest_dir = env_path("CARGO_MANIFEST_DIR")?;
    let out_dir = env_path("OUT_DIR")?;
    Ok(Self::new(crate_root(&manifest_dir)?, out_dir))
  }

  pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
    self.root = root.into();
    self
  }

  pub fn out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
    self.out_dir = out_dir.into();
    self
  }

  pub fn config(mut self, config: Config) -> Self {
    self.config = config;
    self
  }

  pub fn generate(self) -> Result<GeneratedUnits> {
    init_logging();
    println!("cargo:rerun-if-env-changed={}", LOG_ENV);

    let program = Program::load(&self.root)?;
    for path in program.paths() {
      println!("cargo:rerun-if-changed={}", path.display());
    }

    let units = Generator::new(self.config).run(&program);
    let summary = units.write_to(&self.out_dir)?;
    tracing::info!(
      units = units.len(),
      written = summary.written,
      unchanged = summary.unchanged,
      removed = summary.removed,
      "mappers generated"
    );
    Ok(units)
  }
}

fn env_path(name: &'static str) -> Result<PathBuf> {
  std::env::var_os(name)
    .map(PathBuf::from)
    .ok_or(Error::MissingEnv(name))
}

fn crate_root(manifest_dir: &Path) -> Result<PathBuf> {
  let src = manifest_dir.join("src");
  ["lib.rs", "main.rs"]
    .iter()
    .map(|name| src.join(name))
    .find(|path| path.is_file())
    .ok_or_else(|| Error::NoCrateRoot(src))
}

// Build scripts may call this more than once; only the first install wins.
fn init_logging() {
  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .try_init();
}
