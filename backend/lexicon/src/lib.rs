//! # Lexicon
//!
//! Everything the backend derives from a raw name string. No IO, no async.
//!
//! ## Pipeline
//!
//! Given a display name such as `"Ava"` we produce:
//! - **slug**: URL identifier, `[a-z0-9-]` only
//! - **metadata**: length, first letter, last letter
//! - **letter analysis**: vowel/consonant counts and symbolic traits of the first and last letters
//! - **numerology**: Pythagorean digit sum, reduced to 1-9 unless it hits a master number (11, 22, 33)
//!
//! These are pure functions of the name. The server always runs [`derive::derive`] before a record with a new
//! name is persisted, so stored derived fields never drift from the name.
//!
//! ## Scores
//!
//! - [`popularity`]: weighted linear score over views, search appearances and an admin-set trend
//! - [`similarity`]: indicator score between two names (origin, length, numerology)
//!
//! ## Blogs
//!
//! [`reading`] estimates blog read time. Blog slugs reuse [`slug::slugify`].

pub mod derive;
pub mod error;
pub mod letters;
pub mod metadata;
pub mod numerology;
pub mod popularity;
pub mod reading;
pub mod similarity;
pub mod slug;

pub use derive::{Derivation, derive};
pub use error::LexiconError;
pub use letters::{Element, LetterAnalysis, LetterTraits, Nature, Ruling};
pub use metadata::{Metadata, clean_name};
pub use numerology::Numerology;
pub use popularity::Popularity;
pub use similarity::Profile;
pub use slug::slugify;
