use serde::{Deserialize, Serialize};

use crate::error::LexiconError;

/// Trimmed name with internal whitespace runs collapsed to one space. This is the stored form.
pub fn clean_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub length: usize,
    pub first_letter: char,
    pub last_letter: char,
}

impl Metadata {
    /// Expects a name already passed through [`clean_name`].
    pub fn derive(cleaned: &str) -> Result<Self, LexiconError> {
        let mut chars = cleaned.chars();

        let first = chars.next().ok_or(LexiconError::EmptyName)?;
        let last = chars.next_back().unwrap_or(first);

        Ok(Self {
            length: cleaned.chars().count(),
            first_letter: lower(first),
            last_letter: lower(last),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("  Mary   Jane "), "Mary Jane");
        assert_eq!(clean_name("Ava"), "Ava");
        assert_eq!(clean_name(" \t "), "");
    }

    #[test]
    fn test_metadata() {
        let metadata = Metadata::derive("Ava").unwrap();

        assert_eq!(metadata.length, 3);
        assert_eq!(metadata.first_letter, 'a');
        assert_eq!(metadata.last_letter, 'a');
    }

    #[test]
    fn test_single_letter_and_multibyte() {
        let single = Metadata::derive("Q").unwrap();
        assert_eq!((single.length, single.first_letter, single.last_letter), (1, 'q', 'q'));

        let accented = Metadata::derive("Zoë").unwrap();
        assert_eq!(accented.length, 3);
        assert_eq!(accented.last_letter, 'ë');
    }

    #[test]
    fn test_length_matches_cleaned_name() {
        let cleaned = clean_name("  Anne    Marie ");
        assert_eq!(Metadata::derive(&cleaned).unwrap().length, "Anne Marie".len());
    }

    #[test]
    fn test_empty() {
        assert_eq!(Metadata::derive(""), Err(LexiconError::EmptyName));
    }
}
