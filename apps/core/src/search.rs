use crate::model::Prompt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchScope {
    All,
    Group(String),
}

/// Case-insensitive substring search over `(id, record)` pairs.
///
/// An empty keyword never matches everything: it yields an empty result set,
/// so an empty search box cannot degenerate into a full listing. A record
/// matches when the keyword is a substring of any one of its `name`,
/// `content`, `comment`, or `group` fields; fields are tested independently
/// so a match can never span a field boundary.
pub fn search(
    records: &[(String, Prompt)],
    scope: &SearchScope,
    keyword: &str,
) -> Vec<(String, Prompt)> {
    if keyword.is_empty() {
        return Vec::new();
    }

    let needle = keyword.to_lowercase();
    records
        .iter()
        .filter(|(_, prompt)| match scope {
            SearchScope::All => true,
            SearchScope::Group(group) => {
                let group = group.trim();
                !group.is_empty() && prompt.group_name() == group
            }
        })
        .filter(|(_, prompt)| matches_prompt(prompt, &needle))
        .cloned()
        .collect()
}

fn matches_prompt(prompt: &Prompt, needle_lower: &str) -> bool {
    [
        &prompt.name,
        &prompt.content,
        &prompt.comment,
        &prompt.group,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle_lower))
}

/// All non-overlapping case-insensitive literal occurrences of `keyword`
/// within `text`, as half-open `(start, end)` character offsets in
/// left-to-right scan order.
pub fn highlight_ranges(text: &str, keyword: &str) -> Vec<(usize, usize)> {
    if text.is_empty() || keyword.is_empty() {
        return Vec::new();
    }

    let text_chars: Vec<char> = text.chars().collect();
    let keyword_chars: Vec<char> = keyword.chars().collect();
    let window = keyword_chars.len();
    if window > text_chars.len() {
        return Vec::new();
    }

    let mut ranges = Vec::new();
    let mut index = 0;
    while index + window <= text_chars.len() {
        let is_match = text_chars[index..index + window]
            .iter()
            .zip(keyword_chars.iter())
            .all(|(a, b)| chars_eq_ignore_case(*a, *b));

        if is_match {
            ranges.push((index, index + window));
            index += window;
        } else {
            index += 1;
        }
    }

    ranges
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::{highlight_ranges, SearchScope};

    #[test]
    fn highlight_finds_all_occurrences_left_to_right() {
        let ranges = highlight_ranges("abc ABC abc", "abc");
        assert_eq!(ranges, vec![(0, 3), (4, 7), (8, 11)]);
    }

    #[test]
    fn highlight_does_not_overlap() {
        // "aaaa" contains three overlapping "aa" windows; only two survive.
        let ranges = highlight_ranges("aaaa", "aa");
        assert_eq!(ranges, vec![(0, 2), (2, 4)]);
    }

    #[test]
    fn highlight_empty_inputs_yield_no_ranges() {
        assert!(highlight_ranges("", "abc").is_empty());
        assert!(highlight_ranges("abc", "").is_empty());
    }

    #[test]
    fn highlight_offsets_are_character_based() {
        let ranges = highlight_ranges("héllo héllo", "héllo");
        assert_eq!(ranges, vec![(0, 5), (6, 11)]);
    }

    #[test]
    fn group_scope_equality_is_exact() {
        assert_eq!(
            SearchScope::Group("common".to_string()),
            SearchScope::Group("common".to_string())
        );
    }
}
