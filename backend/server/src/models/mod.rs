pub mod blog;
pub mod name;

pub use blog::{BlogDraft, BlogPatch, BlogPost, Category, FeaturedImage, Status};
pub use name::{Gender, checked_trend, NameDraft, NamePatch, NameRecord, Zodiac, ZodiacElement, ZodiacSign};
