//! SQL name -> exported identifier conversion.

use std::collections::HashSet;

use crate::libs::error::InvalidIdentifierError;

/// Prepended when an identifier would start with a digit, in any script.
pub const DIGIT_PREFIX: char = 'X';

/// Converts an SQL identifier into an exported PascalCase identifier.
///
/// Segments are split on any non-alphanumeric character and each
/// segment's first letter is upper-cased; the rest of the segment is kept,
/// so `user_id`, `user-id` and `userId` all become `UserId`.
///
/// ```
/// use schema2struct::ident::derive;
///
/// assert_eq!(derive("created_at").unwrap(), "CreatedAt");
/// assert_eq!(derive("2fa_codes").unwrap(), "X2faCodes");
/// ```
pub fn derive(sql_identifier: &str) -> Result<String, InvalidIdentifierError> {
    let mut out = String::with_capacity(sql_identifier.len());

    for segment in sql_identifier
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
    {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }

    match out.chars().next() {
        None => Err(InvalidIdentifierError {
            input: sql_identifier.to_string(),
        }),
        Some(c) if c.is_numeric() => {
            out.insert(0, DIGIT_PREFIX);
            Ok(out)
        }
        Some(_) => Ok(out),
    }
}

/// Returns `base`, or `base2`, `base3`, ... for the first name not yet in `seen`.
/// The returned name is recorded in `seen`.
pub fn unique(base: &str, seen: &mut HashSet<String>) -> String {
    if seen.insert(base.to_string()) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}{n}");
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Converts a PascalCase identifier to snake_case: `HTTPStatus2` -> `http_status2`.
pub fn to_snake_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                None => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                Some(_) => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("users", "Users")]
    #[case("user_id", "UserId")]
    #[case("user-id", "UserId")]
    #[case("userId", "UserId")]
    #[case("created_at", "CreatedAt")]
    #[case("__leading__trailing__", "LeadingTrailing")]
    #[case("order items", "OrderItems")]
    #[case("2fa_codes", "X2faCodes")]
    #[case("1", "X1")]
    #[case("ñandú_count", "ÑandúCount")]
    #[case("٣_items", "X٣Items")]
    #[case("Ⅻ_legion", "XⅫLegion")]
    fn derives_pascal_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(derive(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("___")]
    #[case("-- --")]
    fn rejects_names_without_alphanumerics(#[case] input: &str) {
        let err = derive(input).unwrap_err();
        assert_eq!(err.input, input);
    }

    #[test]
    fn derive_is_deterministic() {
        for input in ["users", "post_tags", "x_y_z_1", "a1b2"] {
            assert_eq!(derive(input), derive(input));
        }
    }

    #[test]
    fn unique_appends_the_first_free_suffix() {
        let mut seen = HashSet::new();
        let names: Vec<_> = ["user_id", "user_id", "user_id2", "user_id"]
            .into_iter()
            .map(|base| unique(base, &mut seen))
            .collect();
        assert_eq!(names, ["user_id", "user_id2", "user_id22", "user_id3"]);
    }

    #[rstest]
    #[case("UserId", "user_id")]
    #[case("CreatedAt", "created_at")]
    #[case("UserId2", "user_id2")]
    #[case("HTTPStatus", "http_status")]
    #[case("X2faCodes", "x2fa_codes")]
    #[case("Id", "id")]
    fn snake_cases_identifiers(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_snake_case(input), expected);
    }
}
