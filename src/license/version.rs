use std::sync::OnceLock;

use regex::Regex;

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"( v\d+\.| \d| version |, version)(\.\d|\d)*\w*")
            .expect("version pattern is valid")
    })
}

fn paren_chars_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[()]").expect("paren pattern is valid"))
}

fn paren_groups_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(.*?\)").expect("paren group pattern is valid"))
}

/// Remove version suffixes from a license name.
///
/// Returns the cleaned name and the first version fragment found, e.g.
/// `"Apache 2.0"` → `("Apache", Some("2.0"))`. Names without a version are
/// returned unchanged (trimmed) with `None`.
///
/// Removal repeats until nothing matches, so the cleaned name is a fixpoint.
pub fn strip_version(name: &str) -> (String, Option<String>) {
    let re = version_regex();
    let found = re.find(name).map(|m| m.as_str().trim().to_string());

    let mut cleaned = re.replace_all(name, "").trim().to_string();
    loop {
        let next = re.replace_all(&cleaned, "").trim().to_string();
        if next == cleaned {
            break;
        }
        cleaned = next;
    }
    (cleaned, found)
}

/// Drop parenthesis characters but keep their content.
pub fn strip_brackets(name: &str) -> String {
    paren_chars_regex().replace_all(name, "").trim().to_string()
}

/// Drop parenthesized substrings entirely.
pub fn strip_bracket_groups(name: &str) -> String {
    paren_groups_regex().replace_all(name, "").trim().to_string()
}
