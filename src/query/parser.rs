//! Query string parsing.
//!
//! Grammar, one whitespace-separated clause at a time:
//!
//! ```text
//! [+]field:value        exact match
//! [+]field:value*       prefix match
//! [+]field:value~k      fuzzy match within k edits
//! ```
//!
//! The first clause becomes the root of the [`QueryContext`] tree and every
//! following clause a child of it: `+` marks a required (AND) clause, the
//! rest combine as OR. Malformed input is rejected at this boundary with an
//! [`AmberError::Query`] error; the engine never sees an invalid tree.

use crate::error::{AmberError, Result};
use crate::query::{Combine, QueryContext};

/// Parse a query string into a query tree.
pub fn parse(query: &str) -> Result<QueryContext> {
    let mut clauses = Vec::new();
    for raw in query.split_whitespace() {
        clauses.push(parse_clause(raw)?);
    }

    if clauses.is_empty() {
        return Err(AmberError::query("empty query"));
    }

    let mut root = clauses.remove(0);
    root.children.extend(clauses);
    Ok(root)
}

fn parse_clause(raw: &str) -> Result<QueryContext> {
    let (required, rest) = match raw.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };

    let (field, value) = rest
        .split_once(':')
        .ok_or_else(|| AmberError::query(format!("clause without ':': {raw:?}")))?;
    if field.is_empty() {
        return Err(AmberError::query(format!("clause without field: {raw:?}")));
    }

    let mut context = QueryContext::new(field, "");
    if required {
        context.combine = Combine::And;
    }

    let value = match value.rsplit_once('~') {
        Some((head, budget)) => {
            context.fuzzy = true;
            context.edits = budget.parse::<usize>().map_err(|_| {
                AmberError::query(format!("bad edit budget in clause: {raw:?}"))
            })?;
            head
        }
        None => value,
    };

    let value = match value.strip_suffix('*') {
        Some(head) => {
            if context.fuzzy {
                return Err(AmberError::query(format!(
                    "clause cannot be both prefix and fuzzy: {raw:?}"
                )));
            }
            context.prefix = true;
            head
        }
        None => value,
    };

    if value.is_empty() {
        return Err(AmberError::query(format!("clause without value: {raw:?}")));
    }

    context.value = value.to_string();
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_exact_clause() {
        let root = parse("title:amber").unwrap();
        assert_eq!(root.field, "title");
        assert_eq!(root.value, "amber");
        assert!(!root.prefix);
        assert!(!root.fuzzy);
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_parse_prefix_clause() {
        let root = parse("body:cat*").unwrap();
        assert_eq!(root.value, "cat");
        assert!(root.prefix);
    }

    #[test]
    fn test_parse_fuzzy_clause() {
        let root = parse("body:cat~2").unwrap();
        assert_eq!(root.value, "cat");
        assert!(root.fuzzy);
        assert_eq!(root.edits, 2);
    }

    #[test]
    fn test_parse_multiple_clauses() {
        let root = parse("title:amber body:cat* +body:dog~1").unwrap();
        assert_eq!(root.field, "title");
        assert_eq!(root.children.len(), 2);

        assert_eq!(root.children[0].field, "body");
        assert!(root.children[0].prefix);
        assert_eq!(root.children[0].combine, Combine::Or);

        assert_eq!(root.children[1].value, "dog");
        assert!(root.children[1].fuzzy);
        assert_eq!(root.children[1].combine, Combine::And);
    }

    #[test]
    fn test_parse_rejects_empty_query() {
        assert!(matches!(parse("").unwrap_err(), AmberError::Query(_)));
        assert!(matches!(parse("   ").unwrap_err(), AmberError::Query(_)));
    }

    #[test]
    fn test_parse_rejects_malformed_clauses() {
        assert!(parse("noseparator").is_err());
        assert!(parse(":novalue").is_err());
        assert!(parse("field:").is_err());
        assert!(parse("field:*").is_err());
        assert!(parse("field:word~x").is_err());
        assert!(parse("field:word*~1").is_err());
    }
}
