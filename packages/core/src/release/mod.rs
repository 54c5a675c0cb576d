//! Release lookup: which commands image an invocation runs
//!
//! - Storage locator parsing
//! - Object storage capability and its S3 implementation
//! - Account scheme and release metadata reads
//! - Image resolution

pub mod locator;
pub mod metadata;
pub mod resolver;
pub mod store;

pub use locator::{LOCATOR_SCHEME, Locator, parse_locator};
pub use metadata::{
    IMAGE_DIGEST_FIELD, RELEASE_BUCKET_FIELD, fetch_account_scheme, fetch_release_metadata,
    release_storage_key,
};
pub use resolver::{DEFAULT_IMAGE, find_image_from_release, release_image_digest, resolve_image};
pub use store::{ObjectStore, S3Store};
