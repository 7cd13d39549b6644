//! Loading and saving validation policy files.
//!
//! A policy file is YAML. Every field is optional and falls back to the
//! library default:
//!
//! ```yaml
//! min_name_len: 3
//! max_text_len: 80
//! max_snippet_len: 40
//! max_version_component: 99
//! ```

use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use tracing::debug;
use tri_core::ValidationPolicy;

/// Errors reading or writing a policy file.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A limit no declaration could satisfy.
    #[error("invalid policy: {0}")]
    Invalid(String),
}

/// Convenience alias for results with [`PolicyError`].
pub type Result<T> = std::result::Result<T, PolicyError>;

/// Loads a policy from a YAML file and checks its limits.
///
/// # Errors
///
/// Returns [`IoError`](PolicyError::IoError) if the file cannot be read,
/// [`YamlError`](PolicyError::YamlError) if it is not a policy document, or
/// [`Invalid`](PolicyError::Invalid) if a limit rejects every tree.
pub fn load(path: impl AsRef<Path>) -> Result<ValidationPolicy> {
    let path = path.as_ref();
    let reader = BufReader::new(std::fs::File::open(path)?);
    let policy: ValidationPolicy = serde_yaml::from_reader(reader)?;
    check(&policy)?;
    debug!(path = %path.display(), ?policy, "loaded validation policy");
    Ok(policy)
}

/// Writes a policy as YAML.
///
/// # Errors
///
/// Returns [`IoError`](PolicyError::IoError) if the file cannot be created
/// or written, or [`YamlError`](PolicyError::YamlError) if serialization
/// fails.
pub fn save(policy: &ValidationPolicy, path: impl AsRef<Path>) -> Result<()> {
    let mut writer = BufWriter::new(std::fs::File::create(path)?);
    serde_yaml::to_writer(&mut writer, policy)?;
    writer.flush()?;
    Ok(())
}

/// Loads `path` when given, otherwise returns the default policy.
///
/// # Errors
///
/// Same as [`load`].
pub fn load_or_default(path: Option<&Path>) -> Result<ValidationPolicy> {
    match path {
        Some(path) => load(path),
        None => Ok(ValidationPolicy::default()),
    }
}

/// Rejects limits under which no application could be declared: every tree
/// has a name, a `Brief` and a `Version`.
fn check(policy: &ValidationPolicy) -> Result<()> {
    if policy.min_name_len == 0 {
        return Err(PolicyError::Invalid("min_name_len must be at least 1".into()));
    }
    if policy.max_text_len == 0 {
        return Err(PolicyError::Invalid("max_text_len must be at least 1".into()));
    }
    if policy.max_version_component < 0 {
        return Err(PolicyError::Invalid(format!(
            "max_version_component is {}, must not be negative",
            policy.max_version_component
        )));
    }
    Ok(())
}
