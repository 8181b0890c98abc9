use serde::{Deserialize, Serialize};

use crate::metadata::lower;

pub const MASTER_NUMBERS: [u32; 3] = [11, 22, 33];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Numerology {
    pub number: u32,
    pub traits: Vec<String>,
}

impl Numerology {
    /// Never fails; a name with no mapped letters gets number 0 and no traits.
    pub fn of(name: &str) -> Self {
        let number = reduce(name.chars().map(digit).sum());

        Self {
            number,
            traits: traits(number).iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Pythagorean value of a letter, 0 for anything outside `a-z`.
pub fn digit(letter: char) -> u32 {
    match lower(letter) {
        'a' | 'j' | 's' => 1,
        'b' | 'k' | 't' => 2,
        'c' | 'l' | 'u' => 3,
        'd' | 'm' | 'v' => 4,
        'e' | 'n' | 'w' => 5,
        'f' | 'o' | 'x' => 6,
        'g' | 'p' | 'y' => 7,
        'h' | 'q' | 'z' => 8,
        'i' | 'r' => 9,
        _ => 0,
    }
}

fn reduce(mut sum: u32) -> u32 {
    while sum > 9 && !MASTER_NUMBERS.contains(&sum) {
        sum = digit_sum(sum);
    }

    sum
}

fn digit_sum(mut n: u32) -> u32 {
    let mut total = 0;
    while n > 0 {
        total += n % 10;
        n /= 10;
    }

    total
}

/// Master numbers have no listed traits.
pub fn traits(number: u32) -> &'static [&'static str] {
    match number {
        1 => &["leader", "independent", "ambitious", "original", "confident"],
        2 => &["diplomatic", "cooperative", "sensitive", "peaceful", "adaptable"],
        3 => &["creative", "expressive", "social", "optimistic", "artistic"],
        4 => &["practical", "reliable", "stable", "organized", "determined"],
        5 => &["adventurous", "freedom-loving", "versatile", "curious", "energetic"],
        6 => &["nurturing", "responsible", "loving", "harmonious", "supportive"],
        7 => &["analytical", "spiritual", "intelligent", "mysterious", "intuitive"],
        8 => &["powerful", "successful", "ambitious", "material", "authoritative"],
        9 => &["compassionate", "humanitarian", "generous", "wise", "artistic"],
        _ => &[],
    }
}

/// Numbers a stored record can carry for a non-empty name.
pub fn is_valid_number(number: u32) -> bool {
    (1..=9).contains(&number) || MASTER_NUMBERS.contains(&number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ava() {
        let numerology = Numerology::of("Ava");

        assert_eq!(numerology.number, 6);
        assert_eq!(
            numerology.traits,
            ["nurturing", "responsible", "loving", "harmonious", "supportive"]
        );
    }

    #[test]
    fn test_master_number_is_kept() {
        let numerology = Numerology::of("Max");

        assert_eq!(numerology.number, 11);
        assert!(numerology.traits.is_empty());
    }

    #[test]
    fn test_reduction() {
        // o(6)+l(3)+i(9)+v(4)+i(9)+a(1) = 32 -> 5
        assert_eq!(Numerology::of("Olivia").number, 5);
        // non-letters contribute nothing
        assert_eq!(Numerology::of("A-va 2"), Numerology::of("Ava"));
        assert_eq!(reduce(99), 9);
        assert_eq!(reduce(29), 11);
        assert_eq!(reduce(22), 22);
        assert_eq!(reduce(33), 33);
    }

    #[test]
    fn test_empty() {
        let numerology = Numerology::of("");
        assert_eq!(numerology.number, 0);
        assert!(numerology.traits.is_empty());
    }

    #[test]
    fn test_range_for_names() {
        for name in ["Ava", "Max", "Olivia", "Bartholomew", "Zz", "Q", "Maximilian Alexander"] {
            assert!(is_valid_number(Numerology::of(name).number), "{name}");
        }
        assert!(!is_valid_number(0));
        assert!(!is_valid_number(10));
        assert!(is_valid_number(33));
    }
}
