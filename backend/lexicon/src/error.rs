use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexiconError {
    #[error("Name is required")]
    EmptyName,

    #[error("Name must contain at least one letter or digit")]
    EmptySlug,
}
