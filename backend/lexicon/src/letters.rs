use serde::{Deserialize, Serialize};

use crate::metadata::lower;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nature {
    Spiritual,
    Practical,
    Emotional,
    Intellectual,
    Adaptable,
    Mysterious,
    Material,
    Powerful,
    Dramatic,
    Artistic,
    Creative,
    Mental,
    Dynamic,
    Intuitive,
    Sensitive,
    Magnetic,
    Mystical,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ruling {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterTraits {
    pub nature: Nature,
    pub element: Element,
    pub ruling: Ruling,
}

impl LetterTraits {
    pub const UNKNOWN: Self = Self::new(Nature::Unknown, Element::Unknown, Ruling::Unknown);

    const fn new(nature: Nature, element: Element, ruling: Ruling) -> Self {
        Self {
            nature,
            element,
            ruling,
        }
    }

    /// Traits of `letter`, case-insensitive. Anything outside `a-z` is [`LetterTraits::UNKNOWN`].
    pub fn of(letter: char) -> Self {
        let letter = lower(letter);

        if !letter.is_ascii_lowercase() {
            return Self::UNKNOWN;
        }

        LETTER_TABLE[(letter as u8 - b'a') as usize]
    }
}

use Element::{Air, Earth, Fire, Water};

// indexed by `letter - 'a'`
const LETTER_TABLE: [LetterTraits; 26] = [
    LetterTraits::new(Nature::Spiritual, Air, Ruling::Sun),
    LetterTraits::new(Nature::Practical, Earth, Ruling::Mercury),
    LetterTraits::new(Nature::Emotional, Water, Ruling::Moon),
    LetterTraits::new(Nature::Practical, Earth, Ruling::Mars),
    LetterTraits::new(Nature::Intellectual, Air, Ruling::Venus),
    LetterTraits::new(Nature::Adaptable, Fire, Ruling::Mercury),
    LetterTraits::new(Nature::Mysterious, Water, Ruling::Neptune),
    LetterTraits::new(Nature::Material, Earth, Ruling::Saturn),
    LetterTraits::new(Nature::Spiritual, Fire, Ruling::Sun),
    LetterTraits::new(Nature::Powerful, Fire, Ruling::Jupiter),
    LetterTraits::new(Nature::Dramatic, Fire, Ruling::Mars),
    LetterTraits::new(Nature::Artistic, Air, Ruling::Venus),
    LetterTraits::new(Nature::Emotional, Water, Ruling::Moon),
    LetterTraits::new(Nature::Creative, Water, Ruling::Neptune),
    LetterTraits::new(Nature::Practical, Earth, Ruling::Saturn),
    LetterTraits::new(Nature::Mental, Air, Ruling::Uranus),
    LetterTraits::new(Nature::Mysterious, Water, Ruling::Pluto),
    LetterTraits::new(Nature::Dynamic, Fire, Ruling::Sun),
    LetterTraits::new(Nature::Emotional, Water, Ruling::Moon),
    LetterTraits::new(Nature::Creative, Earth, Ruling::Mars),
    LetterTraits::new(Nature::Intuitive, Water, Ruling::Jupiter),
    LetterTraits::new(Nature::Spiritual, Air, Ruling::Mercury),
    LetterTraits::new(Nature::Sensitive, Water, Ruling::Uranus),
    LetterTraits::new(Nature::Magnetic, Fire, Ruling::Uranus),
    LetterTraits::new(Nature::Intuitive, Air, Ruling::Venus),
    LetterTraits::new(Nature::Mystical, Water, Ruling::Pluto),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterAnalysis {
    pub vowels: usize,
    /// Everything that is not `[aeiou]`, spaces and punctuation included.
    pub consonants: usize,
    pub first_letter: LetterTraits,
    pub last_letter: LetterTraits,
}

impl LetterAnalysis {
    pub fn analyze(cleaned: &str) -> Self {
        let length = cleaned.chars().count();
        let vowels = cleaned
            .chars()
            .filter(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'))
            .count();

        let first = cleaned.chars().next();
        let last = cleaned.chars().next_back();

        Self {
            vowels,
            consonants: length - vowels,
            first_letter: first.map_or(LetterTraits::UNKNOWN, LetterTraits::of),
            last_letter: last.map_or(LetterTraits::UNKNOWN, LetterTraits::of),
        }
    }
}
