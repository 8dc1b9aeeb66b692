//! REST content API client: posts, comments, likes and profile images.

use board_types::wire::{EditCommentBody, EditPostBody, LikeBody, NewCommentBody, NewPost};
use board_types::{Comment, CommentId, Post, PostId};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::credentials::TokenSlot;
use crate::error::BoardResult;
use crate::http::{self, Auth, Endpoint};
use crate::profile::ProfileImage;

const PROFILE_IMAGE_PATH: &str = "/api/v1/users/profile-image";

/// Replies may come bare or wrapped in a single named field.
#[derive(Deserialize)]
#[serde(untagged)]
enum PostsEnvelope {
    Wrapped { posts: Vec<Post> },
    Bare(Vec<Post>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PostEnvelope {
    Wrapped { post: Post },
    Bare(Post),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CommentsEnvelope {
    Wrapped { comments: Vec<Comment> },
    Bare(Vec<Comment>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CommentEnvelope {
    Wrapped { comment: Comment },
    Bare(Comment),
}

/// Edit replies only matter for the text they report.
#[derive(Debug, Default, Deserialize)]
struct CommentEdit {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    comment: Option<Box<CommentEdit>>,
}

impl CommentEdit {
    fn into_text(self) -> Option<String> {
        self.comment
            .and_then(|inner| inner.into_text())
            .or(self.text)
    }
}

#[derive(Debug, Clone)]
pub struct ContentClient {
    endpoint: Endpoint,
}

impl ContentClient {
    pub fn new(http: reqwest::Client, base_url: &str, token: TokenSlot) -> Self {
        Self {
            endpoint: Endpoint::new(http, base_url, token),
        }
    }

    pub fn base_url(&self) -> &str {
        self.endpoint.base_url()
    }

    /// Read calls send the token when there is one; the board is public.
    fn read_auth(&self) -> Auth {
        if self.endpoint.token().is_present() {
            Auth::Bearer
        } else {
            Auth::None
        }
    }

    pub async fn list_posts(&self) -> BoardResult<Vec<Post>> {
        let request = self.endpoint.request(Method::GET, "/posts");
        let envelope: PostsEnvelope = self.endpoint.send_json(request, self.read_auth()).await?;
        Ok(match envelope {
            PostsEnvelope::Wrapped { posts } | PostsEnvelope::Bare(posts) => posts,
        })
    }

    pub async fn get_post(&self, id: PostId) -> BoardResult<Post> {
        let request = self.endpoint.request(Method::GET, &format!("/posts/{id}"));
        let envelope: PostEnvelope = self.endpoint.send_json(request, self.read_auth()).await?;
        Ok(unwrap_post(envelope))
    }

    pub async fn create_post(&self, draft: &NewPost) -> BoardResult<Post> {
        let request = self.endpoint.request(Method::POST, "/posts").json(draft);
        let envelope: PostEnvelope = self.endpoint.send_json(request, Auth::Bearer).await?;
        Ok(unwrap_post(envelope))
    }

    /// Returns the updated post when the backend sends one back.
    pub async fn edit_post(&self, id: PostId, content: &str) -> BoardResult<Option<Post>> {
        let request = self
            .endpoint
            .request(Method::PATCH, &format!("/posts/{id}"))
            .json(&EditPostBody { content });
        let body = self.endpoint.send(request, Auth::Bearer).await?;
        Ok(post_from_ack(&body))
    }

    pub async fn delete_post(&self, id: PostId) -> BoardResult<()> {
        let request = self.endpoint.request(Method::DELETE, &format!("/posts/{id}"));
        self.endpoint.send(request, Auth::Bearer).await?;
        Ok(())
    }

    /// Sets the like state. Returns the updated post when the backend sends one back.
    pub async fn set_like(&self, id: PostId, liked: bool) -> BoardResult<Option<Post>> {
        let request = self
            .endpoint
            .request(Method::PATCH, &format!("/posts/{id}"))
            .json(&LikeBody { liked });
        let body = self.endpoint.send(request, Auth::Bearer).await?;
        Ok(post_from_ack(&body))
    }

    pub async fn list_comments(&self, post_id: PostId) -> BoardResult<Vec<Comment>> {
        let request = self
            .endpoint
            .request(Method::GET, &format!("/posts/{post_id}/comments"));
        let envelope: CommentsEnvelope =
            self.endpoint.send_json(request, self.read_auth()).await?;
        Ok(match envelope {
            CommentsEnvelope::Wrapped { comments } | CommentsEnvelope::Bare(comments) => comments,
        })
    }

    pub async fn add_comment(
        &self,
        post_id: PostId,
        text: &str,
        user_name: &str,
    ) -> BoardResult<Comment> {
        let request = self
            .endpoint
            .request(Method::POST, &format!("/posts/{post_id}/comments"))
            .json(&NewCommentBody { text, user_name });
        let envelope: CommentEnvelope = self.endpoint.send_json(request, Auth::Bearer).await?;
        Ok(match envelope {
            CommentEnvelope::Wrapped { comment } | CommentEnvelope::Bare(comment) => comment,
        })
    }

    /// Returns the text the backend reports for the edited comment, if any.
    pub async fn edit_comment(&self, id: CommentId, text: &str) -> BoardResult<Option<String>> {
        let request = self
            .endpoint
            .request(Method::PATCH, &format!("/comments/{id}"))
            .json(&EditCommentBody { text });
        let body = self.endpoint.send(request, Auth::Bearer).await?;
        let edit: Option<CommentEdit> = http::decode_optional(&body).unwrap_or_default();
        Ok(edit.and_then(CommentEdit::into_text))
    }

    pub async fn delete_comment(&self, id: CommentId) -> BoardResult<()> {
        let request = self
            .endpoint
            .request(Method::DELETE, &format!("/comments/{id}"));
        self.endpoint.send(request, Auth::Bearer).await?;
        Ok(())
    }

    /// Uploads the image as multipart field `profile_image`.
    pub async fn upload_profile_image(&self, image: &ProfileImage) -> BoardResult<()> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime)?;
        let form = Form::new().part("profile_image", part);
        let request = self
            .endpoint
            .request(Method::POST, PROFILE_IMAGE_PATH)
            .multipart(form);
        self.endpoint.send(request, Auth::Bearer).await?;
        Ok(())
    }
}

fn unwrap_post(envelope: PostEnvelope) -> Post {
    match envelope {
        PostEnvelope::Wrapped { post } | PostEnvelope::Bare(post) => post,
    }
}

/// Acknowledgments of PATCH calls may be empty or carry only a status
/// message; only a full post is worth applying.
fn post_from_ack(body: &str) -> Option<Post> {
    match http::decode_optional::<PostEnvelope>(body) {
        Ok(envelope) => envelope.map(unwrap_post),
        Err(err) => {
            tracing::debug!(error = %err, "acknowledgment carries no post");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_envelope_accepts_wrapped_and_bare() {
        let wrapped: CommentEnvelope =
            serde_json::from_str(r#"{"comment":{"id":1,"text":"hi","userName":"bob"}}"#).unwrap();
        let bare: CommentEnvelope =
            serde_json::from_str(r#"{"id":1,"text":"hi","userName":"bob"}"#).unwrap();
        for envelope in [wrapped, bare] {
            let (CommentEnvelope::Wrapped { comment } | CommentEnvelope::Bare(comment)) = envelope;
            assert_eq!(comment.text, "hi");
        }
    }

    #[test]
    fn test_comment_edit_text_lookup() {
        let edit: CommentEdit = serde_json::from_str(r#"{"comment":{"text":"new"}}"#).unwrap();
        assert_eq!(edit.into_text().as_deref(), Some("new"));
        let edit: CommentEdit = serde_json::from_str(r#"{"id":3}"#).unwrap();
        assert_eq!(edit.into_text(), None);
    }

    #[test]
    fn test_ack_without_post_is_ignored() {
        assert_eq!(post_from_ack(""), None);
        assert_eq!(post_from_ack(r#"{"message":"updated"}"#), None);
        let post = post_from_ack(r#"{"id":4,"content":"x","likes":["alice"]}"#).unwrap();
        assert_eq!(post.like_count(), 1);
    }

    #[test]
    fn test_posts_envelope_accepts_wrapped_list() {
        let envelope: PostsEnvelope =
            serde_json::from_str(r#"{"posts":[{"id":1,"content":"a"}]}"#).unwrap();
        let PostsEnvelope::Wrapped { posts } = envelope else {
            panic!("expected wrapped posts");
        };
        assert_eq!(posts.len(), 1);
    }
}
