//! Root bootstrap credential handling.
//!
//! The platform writes the one-time root password into a line-oriented
//! text file; the line of interest is `credential=<value>`.

use thiserror::Error;

const CREDENTIAL_KEY: &str = "credential=";

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("unable to find credential entry in root bootstrap credential file")]
    MissingEntry,
}

/// Extract the root bootstrap password from the credential file contents.
///
/// Returns the trimmed value of the first `credential=` line.
pub fn extract_credential(content: &str) -> Result<String, BootstrapError> {
    content
        .lines()
        .find_map(|line| line.strip_prefix(CREDENTIAL_KEY))
        .map(|value| value.trim().to_string())
        .ok_or(BootstrapError::MissingEntry)
}
