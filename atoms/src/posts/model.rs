use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};

use crate::products::model::string_attr;

pub const VALID_STATUSES: [&str; 3] = ["published", "draft", "private"];

pub fn valid_status(status: &str) -> bool {
    VALID_STATUSES.contains(&status)
}

/// Post domain model - a blog-style article
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    /// Markdown body; images ride inline as `![name](src)` references.
    pub content: String,
    pub excerpt: String,
    /// Cover image as an embeddable data URL.
    pub image_base64: String,
    /// Object-storage URLs for images referenced from the content.
    #[serde(default)]
    pub content_images: Vec<String>,
    pub status: String, // "published" | "draft" | "private"
    pub featured: bool,
    /// Audit fields, injected from the session identity on create.
    pub author: String,
    pub author_name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Post {
    /// Build a post from a DynamoDB item. `id` (from the sort key) and
    /// `title` are required; everything else defaults when absent.
    pub fn from_item(item: &HashMap<String, AttributeValue>) -> Result<Post, String> {
        let sk = item
            .get("SK")
            .and_then(|v| v.as_s().ok())
            .ok_or_else(|| "Post item has no sort key".to_string())?;
        let id = sk
            .strip_prefix("POST#")
            .ok_or_else(|| format!("Unexpected sort key: {}", sk))?;
        let title = item
            .get("title")
            .and_then(|v| v.as_s().ok())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| format!("Post {} has no title", id))?;

        let content_images = item
            .get("content_images")
            .and_then(|v| v.as_l().ok())
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.as_s().ok())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default();

        let status = {
            let stored = string_attr(item, "status");
            if valid_status(&stored) {
                stored
            } else {
                "draft".to_string()
            }
        };

        Ok(Post {
            id: id.to_string(),
            title: title.to_string(),
            content: string_attr(item, "content"),
            excerpt: string_attr(item, "excerpt"),
            image_base64: string_attr(item, "image_base64"),
            content_images,
            status,
            featured: item
                .get("featured")
                .and_then(|v| v.as_bool().ok())
                .copied()
                .unwrap_or(false),
            author: string_attr(item, "author"),
            author_name: string_attr(item, "author_name"),
            created_at: string_attr(item, "created_at"),
            updated_at: string_attr(item, "updated_at"),
        })
    }
}

/// Submit payload for a new or edited post. Author fields are not part of
/// the input; they come from the session identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub image_base64: String,
    pub content_images: Vec<String>,
    pub status: String,
    pub featured: bool,
}

impl Default for PostInput {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            excerpt: String::new(),
            image_base64: String::new(),
            content_images: Vec::new(),
            status: "draft".to_string(),
            featured: false,
        }
    }
}

impl PostInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Post title is required".to_string());
        }
        if !valid_status(&self.status) {
            return Err(format!(
                "Status must be one of: {}",
                VALID_STATUSES.join(", ")
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostPayload {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub image_base64: Option<String>,
    pub content_images: Option<Vec<String>>,
    pub status: Option<String>,
    pub featured: Option<bool>,
}

impl UpdatePostPayload {
    pub fn apply_to(&self, post: &mut Post) {
        if let Some(v) = &self.title {
            post.title = v.clone();
        }
        if let Some(v) = &self.content {
            post.content = v.clone();
        }
        if let Some(v) = &self.excerpt {
            post.excerpt = v.clone();
        }
        if let Some(v) = &self.image_base64 {
            post.image_base64 = v.clone();
        }
        if let Some(v) = &self.content_images {
            post.content_images = v.clone();
        }
        if let Some(v) = &self.status {
            post.status = v.clone();
        }
        if let Some(v) = self.featured {
            post.featured = v;
        }
    }
}

/// Full-field patch, used when a submitted draft replaces an existing
/// record. Author fields stay as stored; editing does not reassign them.
impl From<PostInput> for UpdatePostPayload {
    fn from(input: PostInput) -> Self {
        UpdatePostPayload {
            title: Some(input.title),
            content: Some(input.content),
            excerpt: Some(input.excerpt),
            image_base64: Some(input.image_base64),
            content_images: Some(input.content_images),
            status: Some(input.status),
            featured: Some(input.featured),
        }
    }
}

/// Case-insensitive title/content search for the admin list.
pub fn search_posts(posts: Vec<Post>, term: &str) -> Vec<Post> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return posts;
    }
    posts
        .into_iter()
        .filter(|post| {
            post.title.to_lowercase().contains(&term)
                || post.content.to_lowercase().contains(&term)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str, content: &str) -> Post {
        Post {
            id: "p1".to_string(),
            title: title.to_string(),
            content: content.to_string(),
            excerpt: String::new(),
            image_base64: String::new(),
            content_images: Vec::new(),
            status: "published".to_string(),
            featured: false,
            author: String::new(),
            author_name: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn search_matches_title_or_content() {
        let posts = vec![
            post("Autumn arrivals", "New ceramics in store"),
            post("Care guide", "How to season a teapot"),
        ];
        let hits = search_posts(posts.clone(), "TEAPOT");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Care guide");

        let all = search_posts(posts, "  ");
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn input_requires_title_and_known_status() {
        let mut input = PostInput::default();
        assert!(input.validate().unwrap_err().contains("title"));
        input.title = "Autumn arrivals".to_string();
        assert!(input.validate().is_ok());
        input.status = "archived".to_string();
        assert!(input.validate().unwrap_err().contains("Status"));
    }

    #[test]
    fn from_item_falls_back_to_draft_status() {
        let mut item = HashMap::new();
        item.insert("SK".to_string(), AttributeValue::S("POST#p1".to_string()));
        item.insert("title".to_string(), AttributeValue::S("Hello".to_string()));
        item.insert("status".to_string(), AttributeValue::S("bogus".to_string()));
        let parsed = Post::from_item(&item).unwrap();
        assert_eq!(parsed.status, "draft");
        assert!(!parsed.featured);
    }
}
