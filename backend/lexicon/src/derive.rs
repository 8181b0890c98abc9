use serde::{Deserialize, Serialize};

use crate::{
    error::LexiconError, letters::LetterAnalysis, metadata::Metadata, metadata::clean_name,
    numerology::Numerology, slug::slugify,
};

/// Every field that is a function of the name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Derivation {
    pub name: String,
    pub slug: String,
    pub metadata: Metadata,
    pub letter_analysis: LetterAnalysis,
    pub numerology: Numerology,
}

/// Runs the whole pipeline on a raw name. Must be called before any write that sets a name.
pub fn derive(raw: &str) -> Result<Derivation, LexiconError> {
    let name = clean_name(raw);
    let slug = slugify(&name)?;

    if slug.is_empty() {
        return Err(LexiconError::EmptySlug);
    }

    Ok(Derivation {
        metadata: Metadata::derive(&name)?,
        letter_analysis: LetterAnalysis::analyze(&name),
        numerology: Numerology::of(&name),
        slug,
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::letters::{Element, Nature};

    #[test]
    fn test_derive_ava() {
        let derived = derive("  Ava ").unwrap();

        assert_eq!(derived.name, "Ava");
        assert_eq!(derived.slug, "ava");
        assert_eq!(derived.metadata.length, 3);
        assert_eq!(derived.letter_analysis.vowels, 2);
        assert_eq!(derived.letter_analysis.first_letter.element, Element::Air);
        assert_eq!(derived.numerology.number, 6);
    }

    #[test]
    fn test_consistency() {
        for raw in ["Mary   Jane", "Max", "O'Neil", "Jean-Luc", "Aurélie", "x y z"] {
            let derived = derive(raw).unwrap();
            let analysis = &derived.letter_analysis;

            assert_eq!(derived.metadata.length, derived.name.chars().count());
            assert_eq!(analysis.vowels + analysis.consonants, derived.metadata.length);
            assert_eq!(slugify(&derived.slug).unwrap(), derived.slug);
            assert!(crate::numerology::is_valid_number(derived.numerology.number));
        }
    }

    #[test]
    fn test_multi_word_letters() {
        let derived = derive("Mary Jane").unwrap();

        assert_eq!(derived.slug, "mary-jane");
        assert_eq!(derived.metadata.first_letter, 'm');
        assert_eq!(derived.metadata.last_letter, 'e');
        assert_eq!(derived.letter_analysis.last_letter.nature, Nature::Intellectual);
    }

    #[test]
    fn test_rejections() {
        assert_eq!(derive("   "), Err(LexiconError::EmptyName));
        assert_eq!(derive("?!"), Err(LexiconError::EmptySlug));
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_value(derive("Ava").unwrap()).unwrap();

        assert_eq!(json["metadata"]["firstLetter"], "a");
        assert_eq!(json["letterAnalysis"]["lastLetter"]["ruling"], "sun");
        assert_eq!(json["numerology"]["number"], 6);
    }
}
