//! Project manifest (`cdflow.yml`)

use crate::error::CdflowError;
use serde::Deserialize;
use std::path::Path;

/// The parts of `cdflow.yml` the launcher reads
///
/// The manifest carries more keys for the commands image; they are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    /// Locator of the account scheme JSON, e.g. `s3://bucket/account-scheme.json`
    #[serde(default)]
    pub account_scheme: Option<String>,
}

impl Manifest {
    /// Read and parse the manifest at `path`
    pub fn load(path: &Path) -> Result<Self, CdflowError> {
        let contents = std::fs::read_to_string(path).map_err(|e| CdflowError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, CdflowError> {
        serde_yaml::from_str(contents).map_err(|e| CdflowError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The account scheme locator, required for deploys
    pub fn account_scheme(&self, path: &Path) -> Result<&str, CdflowError> {
        self.account_scheme
            .as_deref()
            .ok_or_else(|| CdflowError::MissingField {
                field: "account_scheme",
                location: path.display().to_string(),
            })
    }
}
