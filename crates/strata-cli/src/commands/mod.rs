//! CLI command implementations.

pub mod plan;
pub mod route;

use std::path::Path;

use anyhow::{Context, Result};
use strata_iceberg::types::PartitionSpec;

/// Reads an Iceberg partition spec from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a partition spec.
pub fn load_spec(path: &Path) -> Result<PartitionSpec> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read partition spec: {}", path.display()))?;
    PartitionSpec::from_json(&content)
        .with_context(|| format!("Failed to parse partition spec JSON: {}", path.display()))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Write;

    use tempfile::NamedTempFile;

    /// Writes a single `bucket[N]` spec to a temp file.
    pub fn bucket_spec_file(num_buckets: u32) -> NamedTempFile {
        spec_file(&format!(
            r#"{{"spec-id": 0, "fields": [
                {{"field-id": 1000, "source-id": 1, "name": "id_bucket",
                  "transform": "bucket[{num_buckets}]"}}
            ]}}"#
        ))
    }

    /// Writes raw JSON to a temp file.
    pub fn spec_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_spec() {
        let file = test_support::bucket_spec_file(60);
        let spec = load_spec(file.path()).unwrap();
        assert_eq!(spec.fields.len(), 1);
        assert_eq!(spec.fields[0].transform.bucket_count(), Some(60));
    }

    #[test]
    fn test_load_spec_reports_path() {
        let err = load_spec(Path::new("/nonexistent/spec.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/spec.json"));

        let file = test_support::spec_file("not json");
        let err = load_spec(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse partition spec JSON"));
    }
}
