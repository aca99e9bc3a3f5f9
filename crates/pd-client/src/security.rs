//! Escaping and validation utilities for building SOQL statements.
//!
//! All user-provided string values interpolated into query text MUST
//! pass through [`soql::escape_string`], and any user-influenced
//! identifier (sort columns, field names) MUST be validated with
//! [`soql::is_safe_field_name`] or checked against a whitelist before
//! interpolation.
//!
//! ```rust
//! use pipedash_client::security::soql;
//!
//! let stage = soql::escape_string("Proposal/Price 'Quote'");
//! let clause = format!("StageName = '{}'", stage);
//! ```

/// SOQL escaping utilities for injection prevention.
pub mod soql {
    /// Escape a string value for use in a SOQL string literal.
    ///
    /// Characters with special meaning in SOQL string literals are
    /// neutralized:
    /// - Single quotes (`'`) become (`\'`)
    /// - Backslashes (`\`) become (`\\`)
    /// - Newlines, carriage returns, and tabs become (`\n`, `\r`, `\t`)
    ///
    /// # Example
    ///
    /// ```rust
    /// use pipedash_client::security::soql;
    ///
    /// let safe = soql::escape_string("O'Brien & Co.");
    /// assert_eq!(safe, "O\\'Brien & Co.");
    /// ```
    #[must_use]
    pub fn escape_string(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 16);
        for ch in value.chars() {
            match ch {
                '\'' => escaped.push_str("\\'"),
                '\\' => escaped.push_str("\\\\"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                _ => escaped.push(ch),
            }
        }
        escaped
    }

    /// Validate that a field name contains only safe characters.
    ///
    /// Field names must start with a letter and contain only
    /// alphanumeric characters and underscores.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pipedash_client::security::soql;
    ///
    /// assert!(soql::is_safe_field_name("StageName"));
    /// assert!(!soql::is_safe_field_name("Bad'; DROP TABLE--"));
    /// ```
    #[must_use]
    pub fn is_safe_field_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => {}
            _ => return false,
        }
        name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    }
}
