//! Content Store: the in-memory posts and the comments of the open post.
//!
//! Each mutation is split in three steps:
//! - `prepare_*` validates locally and, where responses can race, takes a ticket;
//! - the request goes through [`ContentClient`];
//! - `apply_*` reconciles the result into [`ContentState`] without I/O.
//!
//! [`ContentStore`] chains the three for callers that just want to await.

pub mod view;

use std::collections::HashSet;

use board_types::wire::NewPost;
use board_types::{Comment, CommentId, Post, PostId};

use crate::api::ContentClient;
use crate::error::{BoardError, BoardResult, ValidationError};
use crate::request_id::{RequestKey, RequestTracker, Ticket};
use crate::validation::require;
use self::view::{BoardPage, BoardQuery};

/// The post shown in detail, with its comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPost {
    pub post: Post,
    pub comments: Vec<Comment>,
}

/// Result of a ticketed reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled<T> {
    /// What the backend acknowledged
    pub value: T,
    /// False when the ticket was stale and local state was left alone
    pub applied: bool,
}

/// Everything the store holds. All methods are synchronous.
#[derive(Debug, Default)]
pub struct ContentState {
    posts: Vec<Post>,
    open: Option<OpenPost>,
    /// Posts liked by the current user whose like list is only a count
    liked: HashSet<PostId>,
    requests: RequestTracker,
}

impl ContentState {
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn open_post(&self) -> Option<&OpenPost> {
        self.open.as_ref()
    }

    /// Loaded post with the most detail: the open view first, then the list.
    pub fn find_post(&self, id: PostId) -> Option<&Post> {
        self.open
            .as_ref()
            .map(|open| &open.post)
            .filter(|p| p.id == id)
            .or_else(|| self.post(id))
    }

    /// Whether `user` currently likes post `id`.
    pub fn is_liked(&self, id: PostId, user: &str) -> bool {
        self.find_post(id)
            .and_then(|p| p.likes.contains(user))
            .unwrap_or_else(|| self.liked.contains(&id))
    }

    pub fn page(&self, query: &BoardQuery) -> BoardPage<'_> {
        view::paginate(&self.posts, query)
    }

    /// Drops everything user-specific (after logout).
    pub fn forget_user(&mut self) {
        self.liked.clear();
    }

    /// Applies `f` to every loaded copy of post `id`.
    fn update_post(&mut self, id: PostId, mut f: impl FnMut(&mut Post)) {
        if let Some(post) = self.posts.iter_mut().find(|p| p.id == id) {
            f(post);
        }
        if let Some(open) = self.open.as_mut().filter(|o| o.post.id == id) {
            f(&mut open.post);
        }
    }

    /// Replaces every loaded copy of `post`, keeping its position.
    fn replace_post(&mut self, post: &Post) {
        self.update_post(post.id, |slot| *slot = post.clone());
    }

    /// Ends a ticket on failure and passes the error through.
    fn fail<T>(&mut self, ticket: Ticket, err: BoardError) -> BoardResult<T> {
        self.requests.finish_if_active(ticket);
        Err(err)
    }

    // ---- posts ----------------------------------------------------------

    pub fn apply_loaded(&mut self, result: BoardResult<Vec<Post>>) -> BoardResult<usize> {
        let posts = result?;
        tracing::debug!(count = posts.len(), "posts loaded");
        self.posts = posts;
        Ok(self.posts.len())
    }

    pub fn prepare_open(&mut self, id: PostId) -> Ticket {
        tracing::trace!(post_id = id, "opening post");
        self.requests.begin(RequestKey::OpenPost)
    }

    pub fn apply_opened(
        &mut self,
        ticket: Ticket,
        result: BoardResult<(Post, Vec<Comment>)>,
    ) -> BoardResult<Reconciled<OpenPost>> {
        let (post, comments) = match result {
            Ok(loaded) => loaded,
            Err(err) => return self.fail(ticket, err),
        };
        let open = OpenPost { post, comments };
        if !self.requests.finish_if_active(ticket) {
            tracing::debug!(post_id = open.post.id, "discarding stale post view");
            return Ok(Reconciled {
                value: open,
                applied: false,
            });
        }
        if let Some(slot) = self.posts.iter_mut().find(|p| p.id == open.post.id) {
            *slot = open.post.clone();
        }
        self.open = Some(open.clone());
        Ok(Reconciled {
            value: open,
            applied: true,
        })
    }

    /// Replaces the listed copy of a freshly fetched post.
    pub fn apply_fetched(&mut self, result: BoardResult<Post>) -> BoardResult<Post> {
        let post = result?;
        self.replace_post(&post);
        Ok(post)
    }

    /// Unmounts the open post. Responses still in flight for it are dropped.
    pub fn close_post(&mut self) {
        self.requests.cancel(RequestKey::OpenPost);
        self.open = None;
    }

    pub fn prepare_create(&self, draft: &NewPost) -> BoardResult<()> {
        require("content", &draft.content)?;
        Ok(())
    }

    /// New posts go to the front regardless of display order.
    pub fn apply_created(&mut self, result: BoardResult<Post>) -> BoardResult<Post> {
        let post = result?;
        tracing::info!(post_id = post.id, "post created");
        self.posts.insert(0, post.clone());
        Ok(post)
    }

    pub fn prepare_edit_post(&mut self, id: PostId, content: &str) -> BoardResult<Ticket> {
        if self.post(id).is_none() {
            return Err(ValidationError::UnknownPost(id).into());
        }
        require("content", content)?;
        Ok(self.requests.begin(RequestKey::EditPost(id)))
    }

    /// Takes the returned post, or patches the content locally when the
    /// acknowledgment has no body.
    pub fn apply_edited(
        &mut self,
        ticket: Ticket,
        id: PostId,
        content: &str,
        result: BoardResult<Option<Post>>,
    ) -> BoardResult<Reconciled<Post>> {
        let returned = match result {
            Ok(returned) => returned,
            Err(err) => return self.fail(ticket, err),
        };
        let Some(current) = self.find_post(id).cloned() else {
            self.requests.finish_if_active(ticket);
            return Err(ValidationError::UnknownPost(id).into());
        };
        let edited = returned.unwrap_or_else(|| Post {
            content: content.to_string(),
            ..current
        });

        let applied = self.requests.finish_if_active(ticket);
        if applied {
            self.replace_post(&edited);
        } else {
            tracing::debug!(post_id = id, "discarding superseded edit");
        }
        Ok(Reconciled {
            value: edited,
            applied,
        })
    }

    pub fn apply_deleted(&mut self, id: PostId, result: BoardResult<()>) -> BoardResult<()> {
        result?;
        self.posts.retain(|p| p.id != id);
        self.liked.remove(&id);
        if self.open.as_ref().is_some_and(|o| o.post.id == id) {
            self.close_post();
        }
        tracing::info!(post_id = id, "post deleted");
        Ok(())
    }

    /// Returns the ticket and the like state to request.
    pub fn prepare_like(&mut self, id: PostId, user: &str) -> BoardResult<(Ticket, bool)> {
        if self.find_post(id).is_none() {
            return Err(ValidationError::UnknownPost(id).into());
        }
        require("user", user)?;
        let target = !self.is_liked(id, user);
        Ok((self.requests.begin(RequestKey::Like(id)), target))
    }

    /// Commits a like toggle once acknowledged. Without a returned post the
    /// pre-computed toggle is applied.
    pub fn apply_like(
        &mut self,
        ticket: Ticket,
        id: PostId,
        user: &str,
        liked: bool,
        result: BoardResult<Option<Post>>,
    ) -> BoardResult<Reconciled<Post>> {
        let returned = match result {
            Ok(returned) => returned,
            Err(err) => return self.fail(ticket, err),
        };
        let Some(current) = self.find_post(id).cloned() else {
            self.requests.finish_if_active(ticket);
            return Err(ValidationError::UnknownPost(id).into());
        };
        let updated = returned.unwrap_or_else(|| Post {
            likes: current.likes.toggled(user, liked),
            ..current
        });

        let applied = self.requests.finish_if_active(ticket);
        if applied {
            self.replace_post(&updated);
            if liked {
                self.liked.insert(id);
            } else {
                self.liked.remove(&id);
            }
        } else {
            tracing::debug!(post_id = id, "discarding superseded like");
        }
        Ok(Reconciled {
            value: updated,
            applied,
        })
    }

    // ---- comments -------------------------------------------------------

    pub fn apply_comments_listed(
        &mut self,
        post_id: PostId,
        result: BoardResult<Vec<Comment>>,
    ) -> BoardResult<Vec<Comment>> {
        let comments = result?;
        if let Some(open) = self.open.as_mut().filter(|o| o.post.id == post_id) {
            open.comments.clone_from(&comments);
        }
        Ok(comments)
    }

    pub fn prepare_add_comment(&self, text: &str, author: &str) -> BoardResult<()> {
        require("comment", text)?;
        require("author", author)?;
        Ok(())
    }

    /// Appends the comment to the open view and bumps the post's count.
    pub fn apply_comment_added(
        &mut self,
        post_id: PostId,
        result: BoardResult<Comment>,
    ) -> BoardResult<Comment> {
        let mut comment = result?;
        comment.post_id.get_or_insert(post_id);

        self.update_post(post_id, |post| post.comments.record_added(&comment));
        if let Some(open) = self.open.as_mut().filter(|o| o.post.id == post_id) {
            open.comments.push(comment.clone());
        }
        tracing::debug!(post_id, comment_id = comment.id, "comment added");
        Ok(comment)
    }

    pub fn prepare_edit_comment(&mut self, id: CommentId, text: &str) -> BoardResult<Ticket> {
        require("comment", text)?;
        Ok(self.requests.begin(RequestKey::EditComment(id)))
    }

    /// Stores the edited text. A reply without text keeps the submitted one.
    pub fn apply_comment_edited(
        &mut self,
        ticket: Ticket,
        id: CommentId,
        text: &str,
        result: BoardResult<Option<String>>,
    ) -> BoardResult<Reconciled<Comment>> {
        let reported = match result {
            Ok(reported) => reported,
            Err(err) => return self.fail(ticket, err),
        };
        let text = reported.unwrap_or_else(|| text.to_string());
        let mut edited = self
            .loaded_comment(id)
            .cloned()
            .unwrap_or_else(|| Comment {
                id,
                post_id: None,
                user_name: String::new(),
                text: String::new(),
                created_at: None,
            });
        edited.text = text;

        let applied = self.requests.finish_if_active(ticket);
        if applied {
            if let Some(open) = self.open.as_mut() {
                for slot in open.comments.iter_mut().filter(|c| c.id == id) {
                    slot.text.clone_from(&edited.text);
                }
            }
            let post_id = edited.post_id.or_else(|| self.comment_post_id(id));
            if let Some(post_id) = post_id {
                self.update_post(post_id, |post| {
                    if let board_types::CommentCount::List(list) = &mut post.comments {
                        for slot in list.iter_mut().filter(|c| c.id == id) {
                            slot.text.clone_from(&edited.text);
                        }
                    }
                });
            }
        }
        Ok(Reconciled {
            value: edited,
            applied,
        })
    }

    /// Removes the comment from the open view and lowers the post's count.
    pub fn apply_comment_deleted(
        &mut self,
        id: CommentId,
        result: BoardResult<()>,
    ) -> BoardResult<()> {
        result?;
        let post_id = self.comment_post_id(id);
        if let Some(open) = self.open.as_mut() {
            open.comments.retain(|c| c.id != id);
        }
        if let Some(post_id) = post_id {
            self.update_post(post_id, |post| post.comments.record_removed(id));
        }
        tracing::debug!(comment_id = id, "comment deleted");
        Ok(())
    }

    /// A loaded comment, from the open view or a post that carries its list.
    fn loaded_comment(&self, id: CommentId) -> Option<&Comment> {
        let open = self
            .open
            .as_ref()
            .and_then(|o| o.comments.iter().find(|c| c.id == id));
        open.or_else(|| self.posts.iter().find_map(|post| listed_comment(post, id)))
    }

    /// Parent post of a loaded comment.
    fn comment_post_id(&self, id: CommentId) -> Option<PostId> {
        if let Some(open) = self.open.as_ref() {
            if let Some(comment) = open.comments.iter().find(|c| c.id == id) {
                return Some(comment.post_id.unwrap_or(open.post.id));
            }
            if listed_comment(&open.post, id).is_some() {
                return Some(open.post.id);
            }
        }
        self.posts
            .iter()
            .find(|post| listed_comment(post, id).is_some())
            .map(|post| post.id)
    }
}

fn listed_comment(post: &Post, id: CommentId) -> Option<&Comment> {
    match &post.comments {
        board_types::CommentCount::List(list) => list.iter().find(|c| c.id == id),
        board_types::CommentCount::Count(_) => None,
    }
}

/// [`ContentState`] plus the client that feeds it.
#[derive(Debug)]
pub struct ContentStore {
    client: ContentClient,
    state: ContentState,
}

impl ContentStore {
    pub fn new(client: ContentClient) -> Self {
        Self {
            client,
            state: ContentState::default(),
        }
    }

    pub fn client(&self) -> &ContentClient {
        &self.client
    }

    pub fn state(&self) -> &ContentState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ContentState {
        &mut self.state
    }

    pub fn posts(&self) -> &[Post] {
        self.state.posts()
    }

    pub fn page(&self, query: &BoardQuery) -> BoardPage<'_> {
        self.state.page(query)
    }

    /// Fetches the whole collection, replacing what was loaded.
    pub async fn load_posts(&mut self) -> BoardResult<&[Post]> {
        let result = self.client.list_posts().await;
        self.state.apply_loaded(result)?;
        Ok(self.state.posts())
    }

    /// Fetches one post and refreshes its loaded copies.
    pub async fn get_post(&mut self, id: PostId) -> BoardResult<Post> {
        let result = self.client.get_post(id).await;
        self.state.apply_fetched(result)
    }

    /// Loads a post with its comments and makes it the open view.
    pub async fn open_post(&mut self, id: PostId) -> BoardResult<OpenPost> {
        let ticket = self.state.prepare_open(id);
        let result = tokio::try_join!(self.client.get_post(id), self.client.list_comments(id));
        Ok(self.state.apply_opened(ticket, result)?.value)
    }

    pub fn close_post(&mut self) {
        self.state.close_post();
    }

    pub async fn create_post(&mut self, draft: &NewPost) -> BoardResult<Post> {
        self.state.prepare_create(draft)?;
        let result = self.client.create_post(draft).await;
        self.state.apply_created(result)
    }

    pub async fn edit_post(&mut self, id: PostId, content: &str) -> BoardResult<Post> {
        let ticket = self.state.prepare_edit_post(id, content)?;
        let result = self.client.edit_post(id, content).await;
        Ok(self.state.apply_edited(ticket, id, content, result)?.value)
    }

    /// Deletes a post. The caller has already confirmed.
    pub async fn delete_post(&mut self, id: PostId) -> BoardResult<()> {
        let result = self.client.delete_post(id).await;
        self.state.apply_deleted(id, result)
    }

    pub async fn toggle_like(&mut self, id: PostId, user: &str) -> BoardResult<Post> {
        let (ticket, liked) = self.state.prepare_like(id, user)?;
        let result = self.client.set_like(id, liked).await;
        Ok(self.state.apply_like(ticket, id, user, liked, result)?.value)
    }

    pub async fn list_comments(&mut self, post_id: PostId) -> BoardResult<Vec<Comment>> {
        let result = self.client.list_comments(post_id).await;
        self.state.apply_comments_listed(post_id, result)
    }

    pub async fn add_comment(
        &mut self,
        post_id: PostId,
        text: &str,
        author: &str,
    ) -> BoardResult<Comment> {
        self.state.prepare_add_comment(text, author)?;
        let result = self.client.add_comment(post_id, text, author).await;
        self.state.apply_comment_added(post_id, result)
    }

    pub async fn edit_comment(&mut self, id: CommentId, text: &str) -> BoardResult<Comment> {
        let ticket = self.state.prepare_edit_comment(id, text)?;
        let result = self.client.edit_comment(id, text).await;
        Ok(self.state.apply_comment_edited(ticket, id, text, result)?.value)
    }

    pub async fn delete_comment(&mut self, id: CommentId) -> BoardResult<()> {
        let result = self.client.delete_comment(id).await;
        self.state.apply_comment_deleted(id, result)
    }
}

#[cfg(test)]
mod tests {
    use board_types::{Category, CommentCount, Likes};

    use super::*;
    use crate::error::AuthErrorKind;

    fn post(id: PostId) -> Post {
        Post {
            id,
            title: None,
            content: format!("post {id}"),
            user_name: "alice".into(),
            created_at: None,
            category: Category::Travel,
            likes: Likes::Count(0),
            comments: CommentCount::Count(0),
            profile_image: None,
        }
    }

    fn comment(id: CommentId, post_id: PostId, text: &str) -> Comment {
        Comment {
            id,
            post_id: Some(post_id),
            user_name: "bob".into(),
            text: text.into(),
            created_at: None,
        }
    }

    fn loaded(ids: &[PostId]) -> ContentState {
        let mut state = ContentState::default();
        state
            .apply_loaded(Ok(ids.iter().copied().map(post).collect()))
            .unwrap();
        state
    }

    fn draft(content: &str) -> NewPost {
        NewPost {
            title: String::new(),
            content: content.into(),
            category: Category::Pets,
            user_name: "alice".into(),
        }
    }

    #[test]
    fn test_created_posts_are_prepended() {
        let mut state = loaded(&[1, 2]);
        for id in [10, 11, 12] {
            let before = state.posts().len();
            state.apply_created(Ok(post(id))).unwrap();
            assert_eq!(state.posts().len(), before + 1);
            assert_eq!(state.posts()[0].id, id);
        }
    }

    #[test]
    fn test_blank_draft_is_rejected() {
        let state = loaded(&[1]);
        let err = state.prepare_create(&draft("   \n")).unwrap_err();
        assert_eq!(err, BoardError::Validation(ValidationError::EmptyField("content")));
        assert!(state.prepare_create(&draft("hi")).is_ok());
    }

    #[test]
    fn test_failed_create_leaves_collection() {
        let mut state = loaded(&[1]);
        let err = state
            .apply_created(Err(BoardError::Network("offline".into())))
            .unwrap_err();
        assert!(matches!(err, BoardError::Network(_)));
        assert_eq!(state.posts().len(), 1);
    }

    #[test]
    fn test_edit_requires_loaded_post() {
        let mut state = loaded(&[1]);
        assert_eq!(
            state.prepare_edit_post(2, "x").unwrap_err(),
            BoardError::Validation(ValidationError::UnknownPost(2))
        );
    }

    #[test]
    fn test_edit_keeps_position_and_patches_without_body() {
        let mut state = loaded(&[3, 2, 1]);
        let ticket = state.prepare_edit_post(2, "changed").unwrap();
        let edited = state.apply_edited(ticket, 2, "changed", Ok(None)).unwrap();

        assert!(edited.applied);
        assert_eq!(state.posts()[1].id, 2);
        assert_eq!(state.posts()[1].content, "changed");
    }

    #[test]
    fn test_superseded_edit_is_discarded() {
        let mut state = loaded(&[1]);
        let first = state.prepare_edit_post(1, "first").unwrap();
        let second = state.prepare_edit_post(1, "second").unwrap();

        let late = state.apply_edited(second, 1, "second", Ok(None)).unwrap();
        assert!(late.applied);
        let stale = state.apply_edited(first, 1, "first", Ok(None)).unwrap();
        assert!(!stale.applied);
        assert_eq!(state.posts()[0].content, "second");
    }

    #[test]
    fn test_delete_removes_and_closes() {
        let mut state = loaded(&[1, 2]);
        let ticket = state.prepare_open(2);
        state.apply_opened(ticket, Ok((post(2), vec![]))).unwrap();

        state.apply_deleted(2, Ok(())).unwrap();
        assert!(state.post(2).is_none());
        assert!(state.open_post().is_none());
    }

    #[test]
    fn test_failed_delete_keeps_post() {
        let mut state = loaded(&[1]);
        let err = BoardError::auth(AuthErrorKind::NotAuthorized);
        assert!(state.apply_deleted(1, Err(err)).is_err());
        assert!(state.post(1).is_some());
    }

    #[test]
    fn test_like_toggles_with_precomputed_state() {
        let mut state = loaded(&[1]);
        let (ticket, liked) = state.prepare_like(1, "alice").unwrap();
        assert!(liked);
        let post = state.apply_like(ticket, 1, "alice", liked, Ok(None)).unwrap();
        assert_eq!(post.value.like_count(), 1);
        assert!(state.is_liked(1, "alice"));

        let (ticket, liked) = state.prepare_like(1, "alice").unwrap();
        assert!(!liked);
        state.apply_like(ticket, 1, "alice", liked, Ok(None)).unwrap();
        assert_eq!(state.post(1).unwrap().like_count(), 0);
        assert!(!state.is_liked(1, "alice"));
    }

    #[test]
    fn test_like_uses_returned_membership() {
        let mut state = loaded(&[1]);
        let (ticket, liked) = state.prepare_like(1, "alice").unwrap();
        let returned = Post {
            likes: Likes::Users(vec!["bob".into(), "alice".into()]),
            ..post(1)
        };
        state
            .apply_like(ticket, 1, "alice", liked, Ok(Some(returned)))
            .unwrap();
        assert_eq!(state.post(1).unwrap().like_count(), 2);
        assert!(state.is_liked(1, "alice"));
    }

    #[test]
    fn test_double_like_only_latest_applies() {
        let mut state = loaded(&[1]);
        let (first, first_target) = state.prepare_like(1, "alice").unwrap();
        let (second, second_target) = state.prepare_like(1, "alice").unwrap();
        assert_eq!(first_target, second_target);

        state
            .apply_like(second, 1, "alice", second_target, Ok(None))
            .unwrap();
        let stale = state
            .apply_like(first, 1, "alice", first_target, Ok(None))
            .unwrap();
        assert!(!stale.applied);
        assert_eq!(state.post(1).unwrap().like_count(), 1);
    }

    #[test]
    fn test_closed_view_discards_late_response() {
        let mut state = loaded(&[1]);
        let ticket = state.prepare_open(1);
        state.close_post();

        let result = state.apply_opened(ticket, Ok((post(1), vec![]))).unwrap();
        assert!(!result.applied);
        assert!(state.open_post().is_none());
    }

    #[test]
    fn test_opened_post_refreshes_listed_copy() {
        let mut state = loaded(&[1]);
        let detailed = Post {
            likes: Likes::Users(vec!["bob".into()]),
            ..post(1)
        };
        let ticket = state.prepare_open(1);
        state
            .apply_opened(ticket, Ok((detailed, vec![comment(4, 1, "hey")])))
            .unwrap();
        assert_eq!(state.post(1).unwrap().like_count(), 1);
        assert_eq!(state.open_post().unwrap().comments.len(), 1);
    }

    #[test]
    fn test_add_comment_updates_view_and_count() {
        let mut state = loaded(&[5]);
        let ticket = state.prepare_open(5);
        state.apply_opened(ticket, Ok((post(5), vec![]))).unwrap();

        state.prepare_add_comment("hi", "bob").unwrap();
        let added = Comment {
            post_id: None,
            ..comment(9, 5, "hi")
        };
        let added = state.apply_comment_added(5, Ok(added)).unwrap();

        assert_eq!(added.post_id, Some(5));
        assert_eq!(state.open_post().unwrap().comments.len(), 1);
        assert_eq!(state.post(5).unwrap().comment_count(), 1);
        assert_eq!(state.open_post().unwrap().post.comment_count(), 1);
    }

    #[test]
    fn test_edit_comment_keeps_submitted_text() {
        let mut state = loaded(&[5]);
        let ticket = state.prepare_open(5);
        state
            .apply_opened(ticket, Ok((post(5), vec![comment(9, 5, "old")])))
            .unwrap();

        let ticket = state.prepare_edit_comment(9, "new").unwrap();
        let edited = state.apply_comment_edited(ticket, 9, "new", Ok(None)).unwrap();
        assert_eq!(edited.value.text, "new");
        assert_eq!(state.open_post().unwrap().comments[0].text, "new");

        let ticket = state.prepare_edit_comment(9, "newer").unwrap();
        state
            .apply_comment_edited(ticket, 9, "newer", Ok(Some("server text".into())))
            .unwrap();
        assert_eq!(state.open_post().unwrap().comments[0].text, "server text");
    }

    #[test]
    fn test_delete_comment_lowers_count() {
        let mut state = loaded(&[5]);
        let ticket = state.prepare_open(5);
        let detailed = Post {
            comments: CommentCount::Count(2),
            ..post(5)
        };
        state
            .apply_opened(
                ticket,
                Ok((detailed, vec![comment(8, 5, "a"), comment(9, 5, "b")])),
            )
            .unwrap();

        state.apply_comment_deleted(8, Ok(())).unwrap();
        assert_eq!(state.open_post().unwrap().comments.len(), 1);
        assert_eq!(state.post(5).unwrap().comment_count(), 1);
    }

    fn listed_with_comment() -> ContentState {
        let mut state = ContentState::default();
        let with_list = Post {
            comments: CommentCount::List(vec![Comment {
                post_id: None,
                ..comment(9, 5, "old")
            }]),
            ..post(5)
        };
        state.apply_loaded(Ok(vec![post(4), with_list])).unwrap();
        state
    }

    #[test]
    fn test_delete_comment_without_open_post_updates_listed_copy() {
        let mut state = listed_with_comment();
        assert!(state.open_post().is_none());

        state.apply_comment_deleted(9, Ok(())).unwrap();
        assert_eq!(state.post(5).unwrap().comment_count(), 0);
        assert_eq!(state.post(4).unwrap().comment_count(), 0);
    }

    #[test]
    fn test_edit_comment_without_open_post_updates_listed_copy() {
        let mut state = listed_with_comment();

        let ticket = state.prepare_edit_comment(9, "new").unwrap();
        let edited = state.apply_comment_edited(ticket, 9, "new", Ok(None)).unwrap();
        assert!(edited.applied);
        assert_eq!(edited.value.user_name, "bob");

        let CommentCount::List(list) = &state.post(5).unwrap().comments else {
            panic!("expected the comment list to survive the edit");
        };
        assert_eq!(list[0].text, "new");
    }
}
