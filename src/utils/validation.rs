use crate::utils::error::{EtlError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: &str, reason: impl Into<String>) -> EtlError {
    EtlError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Object-store endpoints must be plain http(s) URLs.
pub fn validate_url(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(invalid(field, value, "Endpoint URL is empty"));
    }

    let url = Url::parse(value).map_err(|e| invalid(field, value, format!("Not a URL: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            value,
            format!("Endpoint must use http or https, got '{}'", url.scheme()),
        ));
    }
    Ok(())
}

/// Input and output locations: non-empty, no NUL bytes.
pub fn validate_path(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(invalid(field, value, "Location is empty"))
    } else if value.contains('\0') {
        Err(invalid(field, value, "Location contains a NUL byte"))
    } else {
        Ok(())
    }
}

pub fn validate_required_field<'a, T>(field: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| EtlError::MissingConfigError {
        field: field.to_string(),
    })
}

pub fn validate_non_empty_string(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value is blank"));
    }
    Ok(())
}

/// Inclusive on both ends.
pub fn validate_range<T>(field: &str, value: T, min: T, max: T) -> Result<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(invalid(
            field,
            &value.to_string(),
            format!("Expected a value in {}..={}", min, max),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        assert!(validate_url("storage.endpoint", "http://localhost:4566").is_ok());
        assert!(validate_url("storage.endpoint", "https://s3.amazonaws.com").is_ok());
        assert!(validate_url("storage.endpoint", "").is_err());
        assert!(validate_url("storage.endpoint", "localhost").is_err());
        assert!(validate_url("storage.endpoint", "s3://bucket").is_err());
    }

    #[test]
    fn test_locations() {
        assert!(validate_path("source.path", "trip.csv").is_ok());
        assert!(validate_path("source.path", "s3a://onexlab/trip.csv").is_ok());
        assert!(validate_path("source.path", "  ").is_err());
        assert!(validate_path("source.path", "bad\0path").is_err());
    }

    #[test]
    fn test_partition_range_is_inclusive() {
        assert!(validate_range("execution.partitions", 1, 1, 1024).is_ok());
        assert!(validate_range("execution.partitions", 1024, 1, 1024).is_ok());
        assert!(validate_range("execution.partitions", 0, 1, 1024).is_err());
        assert!(validate_range("execution.partitions", 2048, 1, 1024).is_err());
    }

    #[test]
    fn test_range_error_names_the_bounds() {
        let err = validate_range("execution.partitions", 0usize, 1, 1024).unwrap_err();
        match err {
            EtlError::InvalidConfigValueError { value, reason, .. } => {
                assert_eq!(value, "0");
                assert_eq!(reason, "Expected a value in 1..=1024");
            }
            other => panic!("unexpected error: {other}"),
        }

        let name = String::from("m");
        assert!(validate_range("name", name, String::from("a"), String::from("z")).is_ok());
    }

    #[test]
    fn test_required_field() {
        let present = Some("trip.csv".to_string());
        let missing: Option<String> = None;
        assert_eq!(validate_required_field("source.path", &present).unwrap(), "trip.csv");
        assert!(matches!(
            validate_required_field("source.path", &missing),
            Err(EtlError::MissingConfigError { .. })
        ));
    }
}
