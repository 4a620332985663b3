//! Parameter binding and identifier escaping.
//!
//! Values always travel as bound parameters. MySQL has no placeholder for
//! identifiers, so a name that must appear in identifier position is escaped
//! with [`quote_identifier`] instead of being spliced in raw.

use sqlx::MySql;
use sqlx::mysql::MySqlArguments;

/// Bind string parameters to a MySQL query, in order.
pub(crate) fn bind_mysql_params<'q>(
    mut query: sqlx::query::Query<'q, MySql, MySqlArguments>,
    params: &[&'q str],
) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = query.bind(*param);
    }
    query
}

/// Quote a name as a single MySQL identifier.
///
/// The name is wrapped in backticks and embedded backticks are doubled, so the
/// result always denotes exactly one identifier whatever the input contains.
///
/// # Examples
///
/// ```
/// use mysql_mcp_server::db::params::quote_identifier;
///
/// assert_eq!(quote_identifier("orders"), "`orders`");
/// assert_eq!(quote_identifier("we`ird"), "`we``ird`");
/// ```
pub fn quote_identifier(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('`');
    for ch in name.chars() {
        if ch == '`' {
            quoted.push('`');
        }
        quoted.push(ch);
    }
    quoted.push('`');
    quoted
}
