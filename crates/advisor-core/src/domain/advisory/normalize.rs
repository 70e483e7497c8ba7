//! Name normalization for stable node identifiers

/// Normalize a display name into an identifier fragment.
///
/// Lowercases, maps every character outside `[a-z0-9]` to `_`, collapses runs
/// of `_` and trims them from both ends. Total and idempotent; may return an
/// empty string for names with no alphanumeric content.
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
        } else {
            pending_sep = true;
        }
    }

    out
}

/// Title-case a snake_case key ("manual_processes" -> "Manual Processes")
pub fn title_case(key: &str) -> String {
    key.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_examples() {
        assert_eq!(normalize("Manual Process!!"), "manual_process");
        assert_eq!(normalize("  Cash-Flow  Gaps "), "cash_flow_gaps");
        assert_eq!(normalize("POS v2.0"), "pos_v2_0");
        assert_eq!(normalize("QuickBooks"), "quickbooks");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for name in [
            "Manual Process!!",
            "__already__normal__",
            "Zapier Free",
            "Ünïcode Café",
            "",
            "!!!",
            "a  b",
        ] {
            let once = normalize(name);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", name);
        }
    }

    #[test]
    fn test_normalize_output_alphabet() {
        let out = normalize("Weird\tname\n(with) [brackets] & émojis 🚀 42");
        assert!(out.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        assert!(!out.starts_with('_'));
        assert!(!out.ends_with('_'));
        assert!(!out.contains("__"));
    }

    #[test]
    fn test_normalize_degenerate_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("???"), "");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("manual_processes"), "Manual Processes");
        assert_eq!(title_case("communication_issues"), "Communication Issues");
        assert_eq!(title_case("single"), "Single");
    }
}
