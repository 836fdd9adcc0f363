/// Form payloads for post and comment submissions
///
/// Submissions arrive url-encoded. Field rules that need no I/O are checked
/// here; whether a referenced group exists is checked by the post service.
use crate::models::{PostDraft, PostView};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

const IMAGE_EXTENSIONS: &[&str] = &["gif", "jpg", "jpeg", "png", "webp"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PostForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,

    /// Group id; empty means no group
    #[serde(default)]
    pub group: Option<String>,

    /// Stored image name; empty or absent keeps the current image on edit
    #[serde(default)]
    #[validate(length(max = 255))]
    pub image: Option<String>,
}

impl PostForm {
    /// Form pre-filled from an existing post
    pub fn from_post(post: &PostView) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group.as_ref().map(|g| g.id.to_string()),
            image: post.image.clone(),
        }
    }

    /// Trim, validate and convert into a draft
    pub fn to_draft(&self) -> Result<PostDraft, ValidationErrors> {
        let cleaned = PostForm {
            text: self.text.trim().to_string(),
            group: non_empty(self.group.as_deref()),
            image: non_empty(self.image.as_deref()),
        };

        let mut errors = match cleaned.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        let group_id = match cleaned.group.as_deref() {
            None => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("group", invalid_choice());
                    None
                }
            },
        };

        if let Some(image) = cleaned.image.as_deref() {
            if !is_image_name(image) {
                errors.add("image", not_an_image());
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(PostDraft {
            text: cleaned.text,
            group_id,
            image: cleaned.image,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
}

impl CommentForm {
    /// Trimmed text, or the field errors
    pub fn cleaned_text(&self) -> Result<String, ValidationErrors> {
        let cleaned = CommentForm {
            text: self.text.trim().to_string(),
        };
        cleaned.validate()?;
        Ok(cleaned.text)
    }
}

/// Validation error for a group id that doesn't resolve
pub fn invalid_choice() -> ValidationError {
    let mut error = ValidationError::new("invalid_choice");
    error.message = Some("Select a valid choice.".into());
    error
}

fn not_an_image() -> ValidationError {
    let mut error = ValidationError::new("invalid_image");
    error.message = Some("Upload a valid image.".into());
    error
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn is_image_name(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(stem, ext)| {
            !stem.is_empty() && IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(text: &str, group: Option<&str>, image: Option<&str>) -> PostForm {
        PostForm {
            text: text.to_string(),
            group: group.map(str::to_string),
            image: image.map(str::to_string),
        }
    }

    #[test]
    fn test_text_is_trimmed_and_required() {
        let draft = form("  hello  ", None, None).to_draft().unwrap();
        assert_eq!(draft.text, "hello");

        let errors = form("   ", None, None).to_draft().unwrap_err();
        assert!(errors.field_errors().contains_key("text"));
    }

    #[test]
    fn test_empty_group_means_none() {
        let draft = form("text", Some(""), None).to_draft().unwrap();
        assert_eq!(draft.group_id, None);

        let draft = form("text", Some("7"), None).to_draft().unwrap();
        assert_eq!(draft.group_id, Some(7));

        let errors = form("text", Some("seven"), None).to_draft().unwrap_err();
        assert!(errors.field_errors().contains_key("group"));
    }

    #[test]
    fn test_image_names() {
        assert!(is_image_name("posts/small.gif"));
        assert!(is_image_name("photo.JPEG"));
        assert!(!is_image_name("notes.txt"));
        assert!(!is_image_name(".png"));
        assert!(!is_image_name("noextension"));

        let draft = form("text", None, Some("")).to_draft().unwrap();
        assert_eq!(draft.image, None);
        assert!(form("text", None, Some("x.exe")).to_draft().is_err());
    }

    #[test]
    fn test_comment_text() {
        let comment = CommentForm {
            text: " nice ".into(),
        };
        assert_eq!(comment.cleaned_text().unwrap(), "nice");
        assert!(CommentForm::default().cleaned_text().is_err());
    }
}
