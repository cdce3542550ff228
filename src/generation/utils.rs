//! Identifier transformation utilities for code generation
//!
//! Every TypeScript identifier the generator derives from document data goes
//! through one of these functions so the same input always mangles the same way.

/// Converts a string to PascalCase.
///
/// The input is split into runs of ASCII letters and digits; the first
/// character of each run is upper-cased and the rest is kept as-is, so
/// existing camel humps survive.
///
/// # Examples
/// ```
/// use openapi_gen_request::generation::utils::to_pascal_case;
///
/// assert_eq!(to_pascal_case("foo bar"), "FooBar");
/// assert_eq!(to_pascal_case("getUser"), "GetUser");
/// assert_eq!(to_pascal_case("inner_log AttributeChange OpType"), "InnerLogAttributeChangeOpType");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.chars().count() == 1 {
        return trimmed.to_uppercase();
    }

    let words: Vec<&str> = trimmed
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return trimmed.to_string();
    }

    words.into_iter().map(upper_first).collect()
}

/// Turns a dotted namespaced identifier (`inner_log.AttributeChange`) into a
/// single PascalCase identifier (`InnerLogAttributeChange`).
pub fn dotted_to_pascal_case(s: &str) -> String {
    to_pascal_case(&s.split('.').collect::<Vec<_>>().join(" "))
}

/// Converts an arbitrary schema name into the identifier the schema compiler
/// declares it under.
///
/// Characters that cannot appear in a TypeScript identifier become word
/// breaks, `_x` collapses to `X`, and every word is upper-cased on its first
/// letter. Underscores followed by anything other than a lowercase letter are
/// preserved.
pub fn to_safe_identifier(s: &str) -> String {
    let mut spaced = String::with_capacity(s.len());
    for (i, ch) in s.chars().enumerate() {
        let valid = ch.is_ascii_alphanumeric() || ch == '_' || ch == '$';
        if !valid || (i == 0 && ch.is_ascii_digit()) {
            spaced.push(' ');
        } else {
            spaced.push(ch);
        }
    }

    let mut collapsed = String::with_capacity(spaced.len());
    let mut chars = spaced.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '_' {
            if let Some(next) = chars.peek().copied() {
                if next.is_ascii_lowercase() {
                    collapsed.push(next.to_ascii_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        collapsed.push(ch);
    }

    let ident: String = collapsed.split_whitespace().map(upper_first).collect();
    if ident.is_empty() {
        "NoName".to_string()
    } else {
        ident
    }
}

/// Whether `s` can be used as a bare TypeScript property name.
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("foo bar"), "FooBar");
        assert_eq!(to_pascal_case("getUser"), "GetUser");
        assert_eq!(to_pascal_case("TestController"), "TestController");
        assert_eq!(to_pascal_case("user_info"), "UserInfo");
        assert_eq!(to_pascal_case("find-pets-by-status"), "FindPetsByStatus");
        assert_eq!(to_pascal_case("a"), "A");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn test_dotted_to_pascal_case() {
        assert_eq!(dotted_to_pascal_case("foo.bar"), "FooBar");
        assert_eq!(
            dotted_to_pascal_case("inner_log.AttributeChange.OpType"),
            "InnerLogAttributeChangeOpType"
        );
    }

    #[test]
    fn test_to_safe_identifier() {
        assert_eq!(to_safe_identifier("aaa"), "Aaa");
        assert_eq!(to_safe_identifier("foo title"), "FooTitle");
        assert_eq!(to_safe_identifier("user_info"), "UserInfo");
        assert_eq!(to_safe_identifier("Query"), "Query");
        assert_eq!(
            to_safe_identifier("CircularRef_____OpenapiGenRequestAnyToReplace"),
            "CircularRef_____OpenapiGenRequestAnyToReplace"
        );
        assert_eq!(to_safe_identifier("1abc"), "Abc");
        assert_eq!(to_safe_identifier("--"), "NoName");
    }

    #[test]
    fn test_is_valid_identifier() {
        assert!(is_valid_identifier("username"));
        assert!(is_valid_identifier("_id"));
        assert!(is_valid_identifier("$ref"));
        assert!(!is_valid_identifier("x-request-id"));
        assert!(!is_valid_identifier("1st"));
        assert!(!is_valid_identifier(""));
    }
}
