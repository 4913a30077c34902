use serde::{Deserialize, Serialize};

/// Sentinel written into `shortcut` by the new-prompt template; treated the
/// same as an empty field everywhere a chord would be registered.
pub const UNSET_SHORTCUT: &str = "ctrl+*";

/// One prompt record, persisted as a single JSON file in the data directory.
///
/// `name` and `content` are required at parse time; everything else defaults
/// to empty. The `add1`..`add8` fields are reserved extension slots that the
/// core never interprets but always preserves through a read/write cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub name: String,
    #[serde(default)]
    pub shortcut: String,
    pub content: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub add1: String,
    #[serde(default)]
    pub add2: String,
    #[serde(default)]
    pub add3: String,
    #[serde(default)]
    pub add4: String,
    #[serde(default)]
    pub add5: String,
    #[serde(default)]
    pub add6: String,
    #[serde(default)]
    pub add7: String,
    #[serde(default)]
    pub add8: String,
}

impl Prompt {
    /// Default values filled in when the user creates a new prompt.
    pub fn template() -> Self {
        Self {
            name: "New Prompt".to_string(),
            shortcut: UNSET_SHORTCUT.to_string(),
            content: String::new(),
            comment: String::new(),
            group: "common".to_string(),
            add1: String::new(),
            add2: String::new(),
            add3: String::new(),
            add4: String::new(),
            add5: String::new(),
            add6: String::new(),
            add7: String::new(),
            add8: String::new(),
        }
    }

    pub fn with_basics(name: &str, content: &str, group: &str) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
            group: group.to_string(),
            ..Self::template()
        }
    }

    /// True when the record carries a chord worth registering, i.e. the
    /// `shortcut` field is neither empty nor the unset sentinel.
    pub fn has_shortcut(&self) -> bool {
        let shortcut = self.shortcut.trim();
        !shortcut.is_empty() && shortcut != UNSET_SHORTCUT
    }

    pub fn group_name(&self) -> &str {
        self.group.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::{Prompt, UNSET_SHORTCUT};

    #[test]
    fn template_shortcut_counts_as_unset() {
        let prompt = Prompt::template();
        assert_eq!(prompt.shortcut, UNSET_SHORTCUT);
        assert!(!prompt.has_shortcut());
    }

    #[test]
    fn explicit_shortcut_counts_as_set() {
        let mut prompt = Prompt::template();
        prompt.shortcut = "ctrl+alt+g".to_string();
        assert!(prompt.has_shortcut());

        prompt.shortcut = "   ".to_string();
        assert!(!prompt.has_shortcut());
    }
}
