//! Release metadata lookup
//!
//! Two reads against object storage: the account scheme (a JSON document
//! naming the release bucket) and the metadata sidecar attached to a
//! component's release archive (which carries the image digest).

use super::store::ObjectStore;
use crate::error::CdflowError;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// Account-scheme field naming the bucket that holds release archives
pub const RELEASE_BUCKET_FIELD: &str = "release-bucket";

/// Release-metadata field holding the commands image digest
pub const IMAGE_DIGEST_FIELD: &str = "cdflow_image_digest";

/// Object key of a component's release archive
pub fn release_storage_key(component: &str, version: &str) -> String {
    format!("{component}/release-{version}.zip")
}

/// Download and parse the account scheme JSON object
pub async fn fetch_account_scheme<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    key: &str,
) -> Result<Map<String, Value>, CdflowError> {
    let body = store.fetch_object(bucket, key).await?;
    let parse_error = |message: String| CdflowError::MetadataFetch {
        bucket: bucket.to_string(),
        key: key.to_string(),
        message,
    };

    match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(scheme)) => Ok(scheme),
        Ok(_) => Err(parse_error("account scheme is not a JSON object".to_string())),
        Err(e) => Err(parse_error(format!("invalid account scheme JSON: {e}"))),
    }
}

/// Read the `release-bucket` field from an account scheme
pub fn release_bucket<'a>(
    scheme: &'a Map<String, Value>,
    location: &str,
) -> Result<&'a str, CdflowError> {
    scheme
        .get(RELEASE_BUCKET_FIELD)
        .and_then(Value::as_str)
        .ok_or_else(|| CdflowError::MissingField {
            field: RELEASE_BUCKET_FIELD,
            location: format!("account scheme {location}"),
        })
}

/// Metadata attached to a component's release archive
pub async fn fetch_release_metadata<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    component: &str,
    version: &str,
) -> Result<HashMap<String, String>, CdflowError> {
    let key = release_storage_key(component, version);
    debug!("Fetching release metadata from s3://{}/{}", bucket, key);
    store.fetch_metadata(bucket, &key).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeStore;

    #[test]
    fn release_key_is_per_component_and_version() {
        assert_eq!(release_storage_key("myapp", "1.2.3"), "myapp/release-1.2.3.zip");
    }

    #[tokio::test]
    async fn account_scheme_is_parsed_as_object() {
        let store = FakeStore::new().with_object(
            "config",
            "scheme.json",
            r#"{"release-bucket": "acme-releases", "accounts": {"prod": {}}}"#,
        );

        let scheme = fetch_account_scheme(&store, "config", "scheme.json")
            .await
            .unwrap();

        assert_eq!(release_bucket(&scheme, "s3://config/scheme.json").unwrap(), "acme-releases");
        assert!(scheme.contains_key("accounts"));
    }

    #[tokio::test]
    async fn malformed_account_scheme_is_a_fetch_failure() {
        let store = FakeStore::new().with_object("config", "scheme.json", "release-bucket: x");

        let err = fetch_account_scheme(&store, "config", "scheme.json")
            .await
            .unwrap_err();

        assert!(matches!(err, CdflowError::MetadataFetch { .. }));
    }

    #[tokio::test]
    async fn non_object_account_scheme_is_a_fetch_failure() {
        let store = FakeStore::new().with_object("config", "scheme.json", "[1, 2]");

        let err = fetch_account_scheme(&store, "config", "scheme.json")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("not a JSON object"));
    }

    #[tokio::test]
    async fn missing_account_scheme_propagates() {
        let store = FakeStore::new();

        let err = fetch_account_scheme(&store, "config", "scheme.json")
            .await
            .unwrap_err();

        assert!(matches!(err, CdflowError::MetadataFetch { .. }));
    }

    #[test]
    fn release_bucket_must_be_a_string() {
        let scheme: Map<String, Value> =
            serde_json::from_str(r#"{"release-bucket": 7}"#).unwrap();

        let err = release_bucket(&scheme, "s3://config/scheme.json").unwrap_err();

        assert!(matches!(
            err,
            CdflowError::MissingField {
                field: RELEASE_BUCKET_FIELD,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn release_metadata_reads_sidecar_of_archive_key() {
        let store = FakeStore::new().with_metadata(
            "acme-releases",
            "myapp/release-42.zip",
            [(IMAGE_DIGEST_FIELD, "mergermarket/cdflow-commands@sha256:abc")],
        );

        let metadata = fetch_release_metadata(&store, "acme-releases", "myapp", "42")
            .await
            .unwrap();

        assert_eq!(
            metadata.get(IMAGE_DIGEST_FIELD).map(String::as_str),
            Some("mergermarket/cdflow-commands@sha256:abc")
        );
        assert_eq!(store.fetches(), vec!["s3://acme-releases/myapp/release-42.zip"]);
    }
}
