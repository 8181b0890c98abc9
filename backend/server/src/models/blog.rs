use std::str::FromStr;

use chrono::{DateTime, Utc};
use lexicon::{reading::read_time, slugify};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

pub const TITLE_MIN: usize = 10;
pub const TITLE_MAX: usize = 100;
pub const CONTENT_MIN: usize = 100;
pub const EXCERPT_MAX: usize = 200;
pub const META_DESCRIPTION_MAX: usize = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Parenting,
    Pregnancy,
    BabyNames,
    ChildDevelopment,
    Nutrition,
    Health,
    Education,
    Activities,
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let category = match s {
            "parenting" => Self::Parenting,
            "pregnancy" => Self::Pregnancy,
            "baby-names" => Self::BabyNames,
            "child-development" => Self::ChildDevelopment,
            "nutrition" => Self::Nutrition,
            "health" => Self::Health,
            "education" => Self::Education,
            "activities" => Self::Activities,
            _ => return Err(AppError::Validation("Invalid blog category".into())),
        };

        Ok(category)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Draft,
    Published,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedImage {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    pub excerpt: String,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: String,
    pub featured_image: FeaturedImage,
    #[serde(default)]
    pub status: Status,
    pub read_time: usize,
    pub meta_description: String,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    pub fn is_published(&self) -> bool {
        self.status == Status::Published
    }

    /// Same post without its body, for listings.
    pub fn summary(mut self) -> Self {
        self.content.clear();
        self
    }

    fn validate(&self) -> Result<(), AppError> {
        let invalid = |message: &str| Err(AppError::Validation(message.into()));
        let title = self.title.chars().count();

        if title < TITLE_MIN {
            return invalid("Title must be at least 10 characters long");
        }
        if title > TITLE_MAX {
            return invalid("Title cannot exceed 100 characters");
        }
        if self.content.chars().count() < CONTENT_MIN {
            return invalid("Content must be at least 100 characters long");
        }
        if self.excerpt.trim().is_empty() {
            return invalid("Blog excerpt is required");
        }
        if self.excerpt.chars().count() > EXCERPT_MAX {
            return invalid("Excerpt cannot exceed 200 characters");
        }
        if self.meta_description.trim().is_empty() {
            return invalid("Meta description is required");
        }
        if self.meta_description.chars().count() > META_DESCRIPTION_MAX {
            return invalid("Meta description cannot exceed 160 characters");
        }
        if self.featured_image.url.trim().is_empty() {
            return invalid("Featured image is required");
        }
        if self.featured_image.alt.trim().is_empty() {
            return invalid("Featured image alt text is required");
        }

        Ok(())
    }

    /// Slug and read time follow title and content.
    fn derive(&mut self) -> Result<(), AppError> {
        self.title = self.title.trim().to_string();
        self.slug = slugify(&self.title)
            .map_err(|_| AppError::Validation("Blog title is required".into()))?;
        if self.slug.is_empty() {
            return Err(AppError::Validation("Title must contain letters or digits".into()));
        }
        self.read_time = read_time(&self.content);

        Ok(())
    }

    pub fn apply(&mut self, patch: BlogPatch, now: DateTime<Utc>) -> Result<(), AppError> {
        let mut updated = self.clone();

        if let Some(title) = patch.title {
            updated.title = title;
        }
        if let Some(content) = patch.content {
            updated.content = content;
        }
        if let Some(excerpt) = patch.excerpt {
            updated.excerpt = excerpt;
        }
        if let Some(category) = patch.category {
            updated.category = category;
        }
        if let Some(tags) = patch.tags {
            updated.tags = trim_tags(tags);
        }
        if let Some(featured_image) = patch.featured_image {
            updated.featured_image = featured_image;
        }
        if let Some(status) = patch.status {
            updated.status = status;
        }
        if let Some(meta_description) = patch.meta_description {
            updated.meta_description = meta_description;
        }

        updated.derive()?;
        updated.validate()?;
        updated.updated_at = now;

        *self = updated;
        Ok(())
    }
}

fn trim_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlogDraft {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub category: Option<Category>,
    pub tags: Vec<String>,
    pub featured_image: Option<FeaturedImage>,
    pub status: Option<Status>,
    pub meta_description: String,
}

impl BlogDraft {
    pub fn into_post(self, author: String, now: DateTime<Utc>) -> Result<BlogPost, AppError> {
        let category = self
            .category
            .ok_or_else(|| AppError::Validation("Blog category is required".into()))?;
        let featured_image = self
            .featured_image
            .ok_or_else(|| AppError::Validation("Featured image is required".into()))?;

        let mut post = BlogPost {
            id: Uuid::new_v4(),
            title: self.title,
            slug: String::new(),
            content: self.content,
            excerpt: self.excerpt,
            category,
            tags: trim_tags(self.tags),
            author,
            featured_image,
            status: self.status.unwrap_or_default(),
            read_time: 0,
            meta_description: self.meta_description,
            views: 0,
            likes: 0,
            created_at: now,
            updated_at: now,
        };

        post.derive()?;
        post.validate()?;

        Ok(post)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlogPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<Category>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<FeaturedImage>,
    pub status: Option<Status>,
    pub meta_description: Option<String>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn draft(title: &str) -> BlogDraft {
        BlogDraft {
            title: title.into(),
            content: "word ".repeat(250),
            excerpt: "A short excerpt".into(),
            category: Some(Category::BabyNames),
            tags: vec![" names ".into(), "".into(), "tips".into()],
            featured_image: Some(FeaturedImage {
                url: "https://img.example/cover.webp".into(),
                alt: "cover".into(),
            }),
            status: Some(Status::Published),
            meta_description: "All about names".into(),
        }
    }

    #[test]
    fn test_draft_derives_slug_and_read_time() {
        let post = draft("Top Names of 2026!").into_post("u1".into(), Utc::now()).unwrap();

        assert_eq!(post.slug, "top-names-of-2026");
        assert_eq!(post.read_time, 2);
        assert_eq!(post.tags, ["names", "tips"]);
        assert!(post.is_published());
    }

    #[test]
    fn test_validation() {
        assert!(draft("Too short").into_post("u1".into(), Utc::now()).is_err());

        let thin = BlogDraft {
            content: "tiny".into(),
            ..draft("A perfectly fine title")
        };
        assert!(thin.into_post("u1".into(), Utc::now()).is_err());

        let long_meta = BlogDraft {
            meta_description: "x".repeat(161),
            ..draft("A perfectly fine title")
        };
        assert!(long_meta.into_post("u1".into(), Utc::now()).is_err());

        let no_category = BlogDraft {
            category: None,
            ..draft("A perfectly fine title")
        };
        assert!(no_category.into_post("u1".into(), Utc::now()).is_err());
    }

    #[test]
    fn test_blank_content_reads_in_a_minute() {
        let blank = BlogDraft {
            content: " ".repeat(120),
            ..draft("A perfectly fine title")
        };

        assert_eq!(blank.into_post("u1".into(), Utc::now()).unwrap().read_time, 1);
    }

    #[test]
    fn test_patch_follows_title() {
        let mut post = draft("A perfectly fine title").into_post("u1".into(), Utc::now()).unwrap();
        let patch = BlogPatch {
            title: Some("Another perfectly fine title".into()),
            content: Some("word ".repeat(450)),
            ..BlogPatch::default()
        };

        post.apply(patch, Utc::now()).unwrap();

        assert_eq!(post.slug, "another-perfectly-fine-title");
        assert_eq!(post.read_time, 3);
    }

    #[test]
    fn test_invalid_patch_leaves_post() {
        let mut post = draft("A perfectly fine title").into_post("u1".into(), Utc::now()).unwrap();
        let patch = BlogPatch {
            title: Some("short".into()),
            ..BlogPatch::default()
        };

        assert!(post.apply(patch, Utc::now()).is_err());
        assert_eq!(post.slug, "a-perfectly-fine-title");
    }

    #[test]
    fn test_category_names() {
        assert_eq!("baby-names".parse::<Category>().unwrap(), Category::BabyNames);
        assert_eq!(
            serde_json::to_value(Category::ChildDevelopment).unwrap(),
            "child-development"
        );
        assert!("recipes".parse::<Category>().is_err());
    }
}
