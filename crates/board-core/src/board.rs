//! Board context: the Session Store and the Content Store behind one handle.
//!
//! Front ends hold a `Board` and call into it; nothing here is global.
//! Any authenticated call that reports an expired session clears it.

use anyhow::Result;
use board_types::wire::{Credentials, NewPost, Registration};
use board_types::{Category, Comment, CommentId, Post, PostId, User};

use crate::api::ContentClient;
use crate::config::Config;
use crate::content::view::{BoardPage, BoardQuery};
use crate::content::{ContentStore, OpenPost};
use crate::credentials::TokenSlot;
use crate::error::{AuthError, AuthErrorKind, BoardResult};
use crate::gateway::{AuthGateway, SignUpOutcome};
use crate::http;
use crate::profile::ProfileImage;
use crate::session::{Session, SessionStore};
use crate::validation::ChangePassword;

#[derive(Debug)]
pub struct Board {
    session: SessionStore,
    content: ContentStore,
    posts_per_page: usize,
}

impl Board {
    /// Builds the board with the token stored under `BOARD_HOME`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_token(config, TokenSlot::open_default()?)
    }

    pub fn with_token(config: &Config, token: TokenSlot) -> Result<Self> {
        let api_base_url = config.effective_api_base_url()?;
        let http = http::build_client(config.request_timeout())?;
        let gateway = AuthGateway::from_config(config, http.clone(), &api_base_url, token.clone())?;
        tracing::debug!(
            api = %api_base_url,
            backend = gateway.kind().id(),
            "board configured"
        );

        Ok(Self {
            session: SessionStore::new(gateway, token.clone()),
            content: ContentStore::new(ContentClient::new(http, &api_base_url, token)),
            posts_per_page: config.effective_posts_per_page(),
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut ContentStore {
        &mut self.content
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.user()
    }

    /// Default listing query with the configured page size.
    pub fn query(&self) -> BoardQuery {
        BoardQuery {
            per_page: self.posts_per_page,
            ..BoardQuery::default()
        }
    }

    pub fn page(&self, query: &BoardQuery) -> BoardPage<'_> {
        self.content.page(query)
    }

    /// Author name for new content; requires a signed-in user.
    fn author(&self) -> BoardResult<String> {
        self.session
            .user()
            .map(|u| u.display_name().to_string())
            .ok_or_else(|| AuthError::new(AuthErrorKind::NotAuthorized, "Log in to continue").into())
    }

    /// Clears the session when the backend says it is gone.
    fn settle<T>(&mut self, result: BoardResult<T>) -> BoardResult<T> {
        if let Err(err) = &result
            && err.is_session_expired()
        {
            self.session.expire();
            self.content.state_mut().forget_user();
        }
        result
    }

    // ---- session --------------------------------------------------------

    pub async fn restore_session(&mut self) -> &Session {
        self.session.restore_session().await
    }

    pub async fn login(&mut self, credentials: &Credentials) -> BoardResult<User> {
        self.content.state_mut().forget_user();
        self.session.login(credentials).await
    }

    pub async fn sign_up(&mut self, registration: &Registration) -> BoardResult<SignUpOutcome> {
        self.session.sign_up(registration).await
    }

    pub async fn logout(&mut self) {
        self.session.logout().await;
        self.content.state_mut().forget_user();
    }

    pub async fn delete_account(&mut self) -> BoardResult<()> {
        let result = self.session.delete_account().await;
        if result.is_ok() {
            self.content.state_mut().forget_user();
        }
        self.settle(result)
    }

    pub async fn change_password(&mut self, form: &ChangePassword) -> BoardResult<()> {
        let result = self.session.change_password(form).await;
        self.settle(result)
    }

    pub async fn request_username_recovery(&self, email: &str) -> BoardResult<()> {
        self.session.request_username_recovery(email).await
    }

    pub async fn request_password_reset(&self, username: &str, email: &str) -> BoardResult<()> {
        self.session.request_password_reset(username, email).await
    }

    /// Uploads a profile image and keeps it as the session's preview.
    pub async fn upload_profile_image(&mut self, image: ProfileImage) -> BoardResult<()> {
        self.author()?;
        let result = self.content.client().upload_profile_image(&image).await;
        self.settle(result)?;
        tracing::info!(file = %image.file_name, mime = %image.mime, "profile image uploaded");
        self.session.set_profile_preview(image);
        Ok(())
    }

    // ---- content --------------------------------------------------------

    pub async fn load_posts(&mut self) -> BoardResult<&[Post]> {
        let result = self.content.load_posts().await.map(<[Post]>::len);
        self.settle(result)?;
        Ok(self.content.posts())
    }

    pub async fn get_post(&mut self, id: PostId) -> BoardResult<Post> {
        let result = self.content.get_post(id).await;
        self.settle(result)
    }

    pub async fn open_post(&mut self, id: PostId) -> BoardResult<OpenPost> {
        let result = self.content.open_post(id).await;
        self.settle(result)
    }

    pub fn close_post(&mut self) {
        self.content.close_post();
    }

    pub async fn create_post(
        &mut self,
        title: Option<&str>,
        content: &str,
        category: Category,
    ) -> BoardResult<Post> {
        let draft = NewPost {
            title: title.map(str::trim).unwrap_or_default().to_string(),
            content: content.to_string(),
            category,
            user_name: self.author()?,
        };
        let result = self.content.create_post(&draft).await;
        self.settle(result)
    }

    pub async fn edit_post(&mut self, id: PostId, content: &str) -> BoardResult<Post> {
        let result = self.content.edit_post(id, content).await;
        self.settle(result)
    }

    /// Deletes a post. The caller has already confirmed.
    pub async fn delete_post(&mut self, id: PostId) -> BoardResult<()> {
        let result = self.content.delete_post(id).await;
        self.settle(result)
    }

    pub async fn toggle_like(&mut self, id: PostId) -> BoardResult<Post> {
        let user = self.author()?;
        let result = self.content.toggle_like(id, &user).await;
        self.settle(result)
    }

    pub async fn list_comments(&mut self, post_id: PostId) -> BoardResult<Vec<Comment>> {
        let result = self.content.list_comments(post_id).await;
        self.settle(result)
    }

    pub async fn add_comment(&mut self, post_id: PostId, text: &str) -> BoardResult<Comment> {
        let author = self.author()?;
        let result = self.content.add_comment(post_id, text, &author).await;
        self.settle(result)
    }

    pub async fn edit_comment(&mut self, id: CommentId, text: &str) -> BoardResult<Comment> {
        let result = self.content.edit_comment(id, text).await;
        self.settle(result)
    }

    pub async fn delete_comment(&mut self, id: CommentId) -> BoardResult<()> {
        let result = self.content.delete_comment(id).await;
        self.settle(result)
    }
}
