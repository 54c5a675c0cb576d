//! Storage locator parsing
//!
//! A locator names one object as `s3://<bucket>/<key>`. Parsing is purely
//! structural: no normalization and no percent-decoding.

use crate::error::CdflowError;
use std::fmt;

/// Scheme prefix every locator must carry
pub const LOCATOR_SCHEME: &str = "s3://";

/// A bucket and the key of one object inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub bucket: String,
    pub key: String,
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{LOCATOR_SCHEME}{}/{}", self.bucket, self.key)
    }
}

/// Split `s3://bucket/key/with/segments` into `bucket` and `key/with/segments`
pub fn parse_locator(locator: &str) -> Result<Locator, CdflowError> {
    let invalid = |reason| CdflowError::InvalidLocator {
        locator: locator.to_string(),
        reason,
    };

    let rest = locator
        .strip_prefix(LOCATOR_SCHEME)
        .ok_or_else(|| invalid("must start with s3://"))?;
    let (bucket, key) = rest
        .split_once('/')
        .ok_or_else(|| invalid("must contain a bucket and a key"))?;

    Ok(Locator {
        bucket: bucket.to_string(),
        key: key.to_string(),
    })
}
