//! Sort directive parsing for listing endpoints.
//!
//! Clients pass repeatable `sort` query parameters of the form `+field`
//! (ascending) or `-field` (descending). Tokens with any other shape are
//! dropped without error; the order of the surviving tokens is the
//! composite sort order, primary key first.

/// Sort direction for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// The SQL keyword for this direction.
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One parsed sort directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
}

/// Parse raw sort tokens into ordered sort keys.
///
/// `+name` sorts ascending on `name`, `-name` descending. Tokens without a
/// leading sign (including empty strings and a bare `+`/`-`) are discarded
/// silently. Duplicate fields are passed through unchanged; the store's
/// behavior for repeated keys governs the outcome.
pub fn parse_sort(tokens: &[String]) -> Vec<SortKey> {
    tokens
        .iter()
        .filter_map(|token| {
            let (direction, field) = match token.strip_prefix('+') {
                Some(rest) => (Direction::Asc, rest),
                None => match token.strip_prefix('-') {
                    Some(rest) => (Direction::Desc, rest),
                    None => return None,
                },
            };
            if field.is_empty() {
                return None;
            }
            Some(SortKey {
                field: field.to_string(),
                direction,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ascending_and_descending() {
        let keys = parse_sort(&tokens(&["+title", "-release_date"]));
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].field, "title");
        assert_eq!(keys[0].direction, Direction::Asc);
        assert_eq!(keys[1].field, "release_date");
        assert_eq!(keys[1].direction, Direction::Desc);
    }

    #[test]
    fn unsigned_tokens_are_dropped() {
        let keys = parse_sort(&tokens(&["title", "+name", "rating"]));
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].field, "name");
    }

    #[test]
    fn order_among_valid_tokens_is_preserved() {
        let keys = parse_sort(&tokens(&["junk", "-b", "more junk", "+a", "-c"]));
        let fields: Vec<&str> = keys.iter().map(|k| k.field.as_str()).collect();
        assert_eq!(fields, ["b", "a", "c"]);
    }

    #[test]
    fn bare_sign_is_dropped() {
        assert!(parse_sort(&tokens(&["+", "-", ""])).is_empty());
    }

    #[test]
    fn duplicates_pass_through() {
        let keys = parse_sort(&tokens(&["+name", "-name"]));
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].field, "name");
        assert_eq!(keys[1].field, "name");
    }

    #[test]
    fn empty_input_yields_no_ordering() {
        assert!(parse_sort(&[]).is_empty());
    }
}
