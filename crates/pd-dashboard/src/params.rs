//! List operation parameters and validation.
//!
//! Validation runs before any upstream call: pagination bounds, numeric
//! filters, and the sort column are all checked here, and the sort
//! column is resolved against a whitelist rather than interpolated
//! from caller input.

use crate::error::{Error, Result};

/// Maximum page size for the opportunity list.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Sort direction for the opportunity list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// SOQL keyword for this direction.
    pub fn as_soql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Parse from a query-string value, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "ASC" => Some(SortDirection::Asc),
            "DESC" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// Logical sort keys accepted by both providers.
///
/// The variant is the single source of truth for the live ORDER BY
/// column and the offline comparator, so a logical key such as
/// `Owner.Name` maps consistently on both paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortKey {
    CloseDate,
    Amount,
    Name,
    StageName,
    Probability,
    OwnerName,
    AccountName,
}

impl SortKey {
    /// Resolve a caller-supplied column name. Anything outside this
    /// whitelist is rejected, never interpolated.
    pub(crate) fn resolve(logical: &str) -> Option<Self> {
        match logical {
            "CloseDate" => Some(SortKey::CloseDate),
            "Amount" => Some(SortKey::Amount),
            "Name" => Some(SortKey::Name),
            "StageName" => Some(SortKey::StageName),
            "Probability" => Some(SortKey::Probability),
            "Owner.Name" => Some(SortKey::OwnerName),
            "Account.Name" => Some(SortKey::AccountName),
            _ => None,
        }
    }

    /// SOQL ORDER BY column for this key.
    pub(crate) fn soql_column(&self) -> &'static str {
        match self {
            SortKey::CloseDate => "CloseDate",
            SortKey::Amount => "Amount",
            SortKey::Name => "Name",
            SortKey::StageName => "StageName",
            SortKey::Probability => "Probability",
            SortKey::OwnerName => "Owner.Name",
            SortKey::AccountName => "Account.Name",
        }
    }
}

/// Parameters for the opportunity list operation.
#[derive(Debug, Clone)]
pub struct ListParams {
    /// Exact stage name filter.
    pub stage: Option<String>,
    /// Exact owner id filter.
    pub owner_id: Option<String>,
    /// Minimum amount filter (inclusive).
    pub min_amount: Option<f64>,
    /// Sort column; must be one of the whitelisted logical keys.
    pub sort_by: String,
    /// Sort direction.
    pub sort_dir: SortDirection,
    /// Page size, 1 to [`MAX_PAGE_SIZE`].
    pub limit: u32,
    /// Rows to skip before the page.
    pub offset: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            stage: None,
            owner_id: None,
            min_amount: None,
            sort_by: "CloseDate".to_string(),
            sort_dir: SortDirection::Desc,
            limit: 50,
            offset: 0,
        }
    }
}

impl ListParams {
    /// Validate pagination, filter, and sort parameters. Runs before
    /// any upstream call.
    pub fn validate(&self) -> Result<()> {
        if self.limit < 1 || self.limit > MAX_PAGE_SIZE {
            return Err(Error::validation(format!(
                "limit must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.limit
            )));
        }
        if let Some(min_amount) = self.min_amount {
            if !min_amount.is_finite() || min_amount < 0.0 {
                return Err(Error::validation(format!(
                    "min_amount must be a non-negative number, got {}",
                    min_amount
                )));
            }
        }
        self.sort_key()?;
        Ok(())
    }

    /// Resolve the whitelisted sort key, or a validation error.
    pub(crate) fn sort_key(&self) -> Result<SortKey> {
        SortKey::resolve(&self.sort_by)
            .ok_or_else(|| Error::validation(format!("unsupported sort column: {}", self.sort_by)))
    }
}

/// Validate the trailing window size for the pipeline trend.
pub(crate) fn validate_months(months: u32) -> Result<()> {
    if months == 0 {
        return Err(Error::validation("months must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ListParams::default();
        assert_eq!(params.limit, 50);
        assert_eq!(params.offset, 0);
        assert_eq!(params.sort_by, "CloseDate");
        assert_eq!(params.sort_dir, SortDirection::Desc);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_limit_bounds() {
        let mut params = ListParams::default();

        params.limit = 0;
        assert!(params.validate().unwrap_err().is_validation_error());

        params.limit = 201;
        assert!(params.validate().unwrap_err().is_validation_error());

        params.limit = 1;
        assert!(params.validate().is_ok());
        params.limit = 200;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_min_amount_must_be_non_negative_and_finite() {
        let mut params = ListParams::default();

        params.min_amount = Some(-1.0);
        assert!(params.validate().is_err());

        params.min_amount = Some(f64::NAN);
        assert!(params.validate().is_err());

        params.min_amount = Some(f64::INFINITY);
        assert!(params.validate().is_err());

        params.min_amount = Some(0.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_sort_column_whitelist() {
        let mut params = ListParams::default();

        for column in [
            "CloseDate",
            "Amount",
            "Name",
            "StageName",
            "Probability",
            "Owner.Name",
            "Account.Name",
        ] {
            params.sort_by = column.to_string();
            assert!(params.validate().is_ok(), "{column} should be accepted");
        }

        params.sort_by = "Amount; DROP TABLE".to_string();
        assert!(params.validate().unwrap_err().is_validation_error());

        params.sort_by = "CreatedDate".to_string();
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!(SortDirection::parse("asc"), Some(SortDirection::Asc));
        assert_eq!(SortDirection::parse("DESC"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("sideways"), None);
    }

    #[test]
    fn test_months_validation() {
        assert!(validate_months(0).is_err());
        assert!(validate_months(1).is_ok());
        assert!(validate_months(12).is_ok());
    }
}
