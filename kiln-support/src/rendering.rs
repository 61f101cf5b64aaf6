//! Text rendering utilities for human-friendly error messages.
//!
//! Provides helpers to format waiting chains, identity lists,
//! type names and suggestions in error output.

/// Renders a waiting chain as a readable string.
///
/// # Examples
/// ```
/// use kiln_support::rendering::render_chain;
///
/// let chain = vec!["UserService", "UserRepo", "Database"];
/// assert_eq!(render_chain(&chain), "UserService → UserRepo → Database");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Renders one bullet per item, each on its own line and indented.
///
/// ```
/// use kiln_support::rendering::render_list;
///
/// assert_eq!(render_list(&["A", "B"], 2), "  - A\n  - B");
/// ```
pub fn render_list(items: &[impl AsRef<str>], indent: usize) -> String {
    let pad = " ".repeat(indent);
    items
        .iter()
        .map(|item| format!("{pad}- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shortens a fully qualified type name for display.
///
/// ```
/// use kiln_support::rendering::shorten_type_name;
///
/// let short = shorten_type_name("my_app::services::user::UserService");
/// assert_eq!(short, "UserService");
///
/// let short = shorten_type_name("alloc::sync::Arc<dyn my_app::traits::Logger>");
/// assert_eq!(short, "Arc<dyn Logger>");
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut segment = String::new();
    let mut chars = full_name.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                segment.clear();
            }
            '<' | '>' | ',' | ' ' | '&' | '(' | ')' | '[' | ']' | ';' => {
                result.push_str(&segment);
                result.push(ch);
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }

    result.push_str(&segment);
    result
}

/// Suggests registered identities that look like `requested`.
///
/// Substring matches rank first, then candidates within a case-insensitive
/// Levenshtein distance of a third of the requested length (at least one
/// edit).
///
/// ```
/// use kiln_support::rendering::suggest_similar;
///
/// let known = ["UserService", "UserRepository", "Mailer"];
/// assert_eq!(suggest_similar("UserServise", &known, 2), vec!["UserService"]);
/// ```
pub fn suggest_similar(
    requested: &str,
    available: &[impl AsRef<str>],
    max_suggestions: usize,
) -> Vec<String> {
    let requested_lower = requested.to_lowercase();
    let budget = (requested.chars().count() / 3).max(1);

    let mut scored: Vec<(usize, &str)> = available
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| *name != requested)
        .filter_map(|name| {
            let name_lower = name.to_lowercase();
            if !name_lower.is_empty()
                && (name_lower.contains(&requested_lower) || requested_lower.contains(&name_lower))
            {
                return Some((0, name));
            }
            let distance = strsim::levenshtein(&requested_lower, &name_lower);
            (distance <= budget).then_some((distance, name))
        })
        .collect();

    scored.sort_by_key(|(score, _)| *score);
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(_, name)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_simple_chain() {
        assert_eq!(render_chain(&["A", "B", "A"]), "A → B → A");
    }

    #[test]
    fn render_single_element_chain() {
        assert_eq!(render_chain(&["A"]), "A");
    }

    #[test]
    fn render_empty_chain() {
        let chain: Vec<&str> = vec![];
        assert_eq!(render_chain(&chain), "");
    }

    #[test]
    fn render_indented_list() {
        let items = vec![String::from("Mailer"), String::from("Smtp")];
        assert_eq!(render_list(&items, 4), "    - Mailer\n    - Smtp");
    }

    #[test]
    fn shorten_simple_path() {
        assert_eq!(
            shorten_type_name("my_app::services::UserService"),
            "UserService"
        );
    }

    #[test]
    fn shorten_with_generics() {
        assert_eq!(
            shorten_type_name("alloc::sync::Arc<dyn my_app::traits::Logger>"),
            "Arc<dyn Logger>"
        );
    }

    #[test]
    fn shorten_no_path() {
        assert_eq!(shorten_type_name("String"), "String");
    }

    #[test]
    fn suggest_ignores_case() {
        let available = vec!["Mailer", "Database"];
        assert_eq!(suggest_similar("DATABSE", &available, 3), vec!["Database"]);
    }

    #[test]
    fn suggest_typo() {
        let available = vec!["UserService", "UserRepository", "Logger", "Database"];
        let suggestions = suggest_similar("Databse", &available, 3);
        assert_eq!(suggestions, vec!["Database"]);
    }

    #[test]
    fn suggest_substring_first() {
        let available = vec!["Mailr", "SmtpMailer"];
        let suggestions = suggest_similar("Mailer", &available, 3);
        assert_eq!(suggestions[0], "SmtpMailer");
        assert_eq!(suggestions.len(), 2);
    }

    #[test]
    fn suggest_no_match() {
        let available = vec!["Database"];
        assert!(suggest_similar("XyzAbcDef", &available, 3).is_empty());
    }
}
