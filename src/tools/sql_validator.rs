//! SQL statement classification for the execute-query tool.
//!
//! Classification is lexical only: the statement is trimmed and uppercased,
//! its leading keyword must belong to the allowed set of the active
//! [`QueryMode`], and none of the mode's denylisted keywords may appear
//! anywhere in the text. The substring check is coarse on purpose and will
//! reject legitimate statements such as `... WHERE note = 'update later'`
//! under the moderate and strict modes.
//!
//! Anything not explicitly allowed is rejected before a connection is
//! acquired.

use crate::error::{ToolError, ToolResult};
use clap::ValueEnum;
use std::fmt;

/// Policy governing which statements execute-query accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum QueryMode {
    /// SELECT or INSERT; rejects statements containing DROP
    Permissive,
    /// SELECT or INSERT; rejects statements containing UPDATE, DELETE or DROP
    Moderate,
    /// SELECT only; rejects statements containing INSERT, UPDATE, DELETE or DROP
    #[default]
    Strict,
}

impl QueryMode {
    /// Leading keywords a statement may start with.
    pub fn allowed_leading(self) -> &'static [&'static str] {
        match self {
            Self::Permissive | Self::Moderate => &["SELECT", "INSERT"],
            Self::Strict => &["SELECT"],
        }
    }

    /// Keywords that reject a statement wherever they appear.
    pub fn denied_keywords(self) -> &'static [&'static str] {
        match self {
            Self::Permissive => &["DROP"],
            Self::Moderate => &["UPDATE", "DELETE", "DROP"],
            Self::Strict => &["INSERT", "UPDATE", "DELETE", "DROP"],
        }
    }

    /// Whether execute-query payloads carry `affectedRows`.
    pub fn reports_affected_rows(self) -> bool {
        !matches!(self, Self::Strict)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Permissive => "permissive",
            Self::Moderate => "moderate",
            Self::Strict => "strict",
        }
    }

    fn rejection_message(self) -> &'static str {
        match self {
            Self::Permissive | Self::Moderate => {
                "Only SELECT and INSERT queries are allowed for safety"
            }
            Self::Strict => "Only SELECT queries are allowed for safety",
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class of an accepted statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
}

impl StatementKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "SELECT" => Some(Self::Select),
            "INSERT" => Some(Self::Insert),
            _ => None,
        }
    }
}

/// Stateless gate applied to every execute-query statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryClassifier {
    mode: QueryMode,
}

impl QueryClassifier {
    pub fn new(mode: QueryMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    /// Classify a statement, failing with [`ToolError::QueryRejected`] when the
    /// active mode does not permit it.
    ///
    /// # Examples
    ///
    /// ```
    /// use mysql_mcp_server::tools::sql_validator::{QueryClassifier, QueryMode, StatementKind};
    ///
    /// let strict = QueryClassifier::new(QueryMode::Strict);
    /// assert_eq!(strict.classify("  select 1").unwrap(), StatementKind::Select);
    /// assert!(strict.classify("INSERT INTO t VALUES (1)").is_err());
    ///
    /// let permissive = QueryClassifier::new(QueryMode::Permissive);
    /// assert_eq!(
    ///     permissive.classify("INSERT INTO t VALUES (1)").unwrap(),
    ///     StatementKind::Insert
    /// );
    /// ```
    pub fn classify(&self, query: &str) -> ToolResult<StatementKind> {
        let normalized = query.trim().to_uppercase();
        let keyword = leading_keyword(&normalized);

        let kind = StatementKind::from_keyword(keyword)
            .filter(|_| self.mode.allowed_leading().contains(&keyword))
            .ok_or_else(|| ToolError::rejected(self.mode.rejection_message()))?;

        if let Some(denied) = self
            .mode
            .denied_keywords()
            .iter()
            .find(|kw| normalized.contains(*kw))
        {
            return Err(ToolError::rejected(format!(
                "{} (statement contains {})",
                self.mode.rejection_message(),
                denied
            )));
        }

        Ok(kind)
    }

    pub fn is_allowed(&self, query: &str) -> bool {
        self.classify(query).is_ok()
    }
}

/// Leading run of ASCII letters, digits and underscores.
fn leading_keyword(normalized: &str) -> &str {
    let end = normalized
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(normalized.len());
    &normalized[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier(mode: QueryMode) -> QueryClassifier {
        QueryClassifier::new(mode)
    }

    // =========================================================================
    // Leading keyword
    // =========================================================================

    #[test]
    fn test_leading_keyword_stops_at_punctuation() {
        assert_eq!(leading_keyword("SELECT*FROM T"), "SELECT");
        assert_eq!(leading_keyword("SELECT(1)"), "SELECT");
        assert_eq!(leading_keyword("(SELECT 1)"), "");
        assert_eq!(leading_keyword(""), "");
    }

    #[test]
    fn test_selected_is_not_select() {
        assert!(!classifier(QueryMode::Strict).is_allowed("SELECTED 1"));
    }

    // =========================================================================
    // Strict mode
    // =========================================================================

    #[test]
    fn test_strict_allows_select() {
        let result = classifier(QueryMode::Strict).classify("SELECT * FROM users");
        assert_eq!(result.unwrap(), StatementKind::Select);
    }

    #[test]
    fn test_strict_is_case_insensitive_and_trims() {
        assert!(classifier(QueryMode::Strict).is_allowed("\n\t  select id from users  "));
    }

    #[test]
    fn test_strict_rejects_insert() {
        let err = classifier(QueryMode::Strict)
            .classify("INSERT INTO users VALUES (1)")
            .unwrap_err();
        assert!(matches!(err, ToolError::QueryRejected { .. }));
        assert!(err.to_string().contains("Only SELECT queries"));
    }

    #[test]
    fn test_strict_rejects_smuggled_delete() {
        let err = classifier(QueryMode::Strict)
            .classify("SELECT 1; DELETE FROM users")
            .unwrap_err();
        assert!(err.to_string().contains("DELETE"));
    }

    #[test]
    fn test_strict_rejects_non_statements() {
        let strict = classifier(QueryMode::Strict);
        assert!(!strict.is_allowed(""));
        assert!(!strict.is_allowed("   "));
        assert!(!strict.is_allowed("SHOW TABLES"));
        assert!(!strict.is_allowed("-- SELECT\nSELECT 1"));
    }

    // =========================================================================
    // Moderate mode
    // =========================================================================

    #[test]
    fn test_moderate_allows_insert() {
        let result = classifier(QueryMode::Moderate).classify("insert into t (a) values (1)");
        assert_eq!(result.unwrap(), StatementKind::Insert);
    }

    #[test]
    fn test_moderate_rejects_keyword_inside_literal() {
        let result = classifier(QueryMode::Moderate)
            .classify("SELECT * FROM users WHERE note = 'update later'");
        assert!(matches!(result, Err(ToolError::QueryRejected { .. })));
    }

    #[test]
    fn test_moderate_rejects_update_statement() {
        assert!(!classifier(QueryMode::Moderate).is_allowed("UPDATE users SET a = 1"));
    }

    // =========================================================================
    // Permissive mode
    // =========================================================================

    #[test]
    fn test_permissive_only_denies_drop() {
        let permissive = classifier(QueryMode::Permissive);
        assert!(permissive.is_allowed("SELECT * FROM users WHERE note = 'update later'"));
        assert!(permissive.is_allowed("INSERT INTO audit SELECT * FROM deleted_rows"));
        assert!(!permissive.is_allowed("SELECT 1; DROP TABLE users"));
        assert!(!permissive.is_allowed("select 'dropdown' as widget"));
    }

    #[test]
    fn test_permissive_rejects_update_leading() {
        let err = classifier(QueryMode::Permissive)
            .classify("UPDATE users SET a = 1")
            .unwrap_err();
        assert!(err.to_string().contains("Only SELECT and INSERT"));
    }

    // =========================================================================
    // Mode properties
    // =========================================================================

    #[test]
    fn test_default_mode_is_strict() {
        assert_eq!(QueryMode::default(), QueryMode::Strict);
        assert_eq!(QueryClassifier::default().mode(), QueryMode::Strict);
    }

    #[test]
    fn test_affected_rows_reporting() {
        assert!(QueryMode::Permissive.reports_affected_rows());
        assert!(QueryMode::Moderate.reports_affected_rows());
        assert!(!QueryMode::Strict.reports_affected_rows());
    }

    #[test]
    fn test_mode_parses_from_cli_value() {
        assert_eq!(
            QueryMode::from_str("moderate", true).unwrap(),
            QueryMode::Moderate
        );
        assert_eq!(QueryMode::Permissive.to_string(), "permissive");
    }
}
