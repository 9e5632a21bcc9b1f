//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CatalogError;

/// Response carrying only a human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Outcome description.
    pub message: String,
}

/// Treats absent and blank query values alike.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parses an optional query value, naming the parameter on failure.
pub(crate) fn parse_param<T: std::str::FromStr>(
    name: &str,
    value: Option<&str>,
) -> Result<Option<T>, CatalogError> {
    non_blank(value)
        .map(|v| {
            v.parse()
                .map_err(|_| CatalogError::Invalid(format!("invalid {name}: '{v}'")))
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_absent() {
        assert_eq!(parse_param::<u32>("days", Some("  ")), Ok(None));
        assert_eq!(parse_param::<u32>("days", None), Ok(None));
    }

    #[test]
    fn bad_values_name_the_parameter() {
        let Err(err) = parse_param::<u32>("days", Some("seven")) else {
            panic!("non-numeric days must fail");
        };
        assert_eq!(err.to_string(), "invalid days: 'seven'");
    }
}
