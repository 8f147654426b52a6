use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GenarcError;

/// Identifier recorded in the archive descriptor and used to name the
/// derived cytoband file, so it must be usable as a file name component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomeId(String);

impl GenomeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GenomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GenomeId {
    type Err = GenarcError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_string();
        let is_valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|ch| !ch.is_whitespace() && ch != '/' && ch != '\\');
        if !is_valid {
            return Err(GenarcError::InvalidGenomeId(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

pub fn is_url(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    ["http://", "https://", "ftp://", "file://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

/// Descriptor values use forward slashes; URLs are recorded verbatim.
pub fn normalize_location(location: &str) -> String {
    if is_url(location) {
        location.to_string()
    } else {
        location.replace('\\', "/")
    }
}
