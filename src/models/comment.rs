/// Blog comments
use super::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment left on a blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
    #[serde(default)]
    pub likes: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Comment {
    type Id = i64;

    fn id(&self) -> &i64 {
        &self.id
    }
}

impl Comment {
    /// Short preview for table cells
    pub fn excerpt(&self, max_chars: usize) -> String {
        if self.content.chars().count() <= max_chars {
            return self.content.clone();
        }
        let mut preview: String = self.content.chars().take(max_chars).collect();
        preview.push('…');
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(content: &str) -> Comment {
        Comment {
            id: 1,
            post_id: 10,
            user_id: 7,
            content: content.to_string(),
            likes: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(comment("Jolies roses").excerpt(20), "Jolies roses");
        assert_eq!(comment("Très jolies roses").excerpt(4), "Très…");
    }

    #[test]
    fn test_missing_likes_default_to_zero() {
        let comment: Comment = serde_json::from_str(
            r#"{"id":1,"post_id":2,"user_id":3,"content":"Merci !",
                "created_at":"2024-05-01T10:00:00Z","updated_at":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(comment.likes, 0);
    }
}
