//! Report query parameters.

use serde::Deserialize;
use utoipa::IntoParams;

use super::common_dto::parse_param;
use crate::domain::activity::DEFAULT_HISTORY_DAYS;
use crate::domain::{ActivityAction, HistoryQuery};
use crate::error::CatalogError;

/// Query parameters for `GET /reports/history`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct HistoryParams {
    /// Window length in days (1..=3650, default 7).
    #[serde(alias = "days")]
    pub time_range: Option<String>,
    /// Only entries with this action (`create`, `update`, `delete`).
    pub action: Option<String>,
}

impl HistoryParams {
    /// Validates the parameters into a history query.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] for a non-numeric or out-of-range
    /// time range or an unknown action. `all` means no action filter.
    pub fn into_query(self) -> Result<HistoryQuery, CatalogError> {
        let days = parse_param::<u32>("timeRange", self.time_range.as_deref())?
            .unwrap_or(DEFAULT_HISTORY_DAYS);
        let action = match self.action.as_deref().map(str::trim) {
            None | Some("" | "all") => None,
            Some(raw) => Some(raw.parse::<ActivityAction>()?),
        };
        Ok(HistoryQuery::new(days, action)?)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_seven_days_all_actions() {
        let Ok(query) = HistoryParams::default().into_query() else {
            panic!("defaults are valid");
        };
        assert_eq!(query, HistoryQuery::default());
    }

    #[test]
    fn all_means_no_filter() {
        let params = HistoryParams {
            time_range: Some("30".to_string()),
            action: Some("all".to_string()),
        };
        let Ok(query) = params.into_query() else {
            panic!("valid params");
        };
        assert_eq!(query.days(), 30);
        assert_eq!(query.action(), None);
    }

    #[test]
    fn out_of_range_days_are_invalid() {
        let params = HistoryParams {
            time_range: Some("0".to_string()),
            action: None,
        };
        assert!(matches!(params.into_query(), Err(CatalogError::Invalid(_))));
    }
}
