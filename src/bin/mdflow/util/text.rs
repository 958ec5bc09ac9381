/// Greedy word wrap; never returns an empty vector.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for word in text.split_whitespace() {
        match lines.last_mut() {
            Some(line) if line.chars().count() + 1 + word.chars().count() <= width => {
                line.push(' ');
                line.push_str(word);
            }
            _ => lines.push(word.to_string()),
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Shortens `s` to at most `max_len` characters, ending with `…` when cut.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    match max_len {
        0 => String::new(),
        n => s.chars().take(n - 1).chain(std::iter::once('…')).collect(),
    }
}

/// Splits `A,B,C` into trimmed, non-empty names.
pub fn split_names(spec: &str) -> Vec<&str> {
    spec.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_at_word_boundaries() {
        assert_eq!(wrap("hello world", 20), vec!["hello world"]);
        assert_eq!(
            wrap("nonbonded cutoff exceeds half the box", 16),
            vec!["nonbonded cutoff", "exceeds half the", "box"]
        );
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn truncates_by_characters() {
        assert_eq!(truncate("Potential", 20), "Potential");
        assert_eq!(truncate("Potential", 9), "Potential");
        assert_eq!(truncate("Potential Energy", 8), "Potenti…");
        assert_eq!(truncate("φ(C1-C2-C3-C4)", 4), "φ(C…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn splits_atom_lists() {
        assert_eq!(split_names("C1, C2"), vec!["C1", "C2"]);
        assert_eq!(split_names("BUT:C1,2:C4,"), vec!["BUT:C1", "2:C4"]);
    }
}
