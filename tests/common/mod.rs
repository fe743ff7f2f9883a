//! Shared fakes for the integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::json;
use url::Url;

use mattermost_utils::api::{MattermostApi, Pager, Post, StatusOk, User};
use mattermost_utils::error::TransportError;
use mattermost_utils::response::ApiResponse;
use mattermost_utils::transfer::Downloader;
use mattermost_utils::ui::Console;

/// In-memory writer that can be read back after the console is done.
#[derive(Clone, Default)]
pub struct Captured(Rc<RefCell<Vec<u8>>>);

impl Captured {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn captured_console(verbose: bool) -> (Console, Captured, Captured) {
    let out = Captured::default();
    let err = Captured::default();
    (Console::with_writers(verbose, out.clone(), err.clone()), out, err)
}

pub fn app_error(status_code: i32, message: &str) -> String {
    json!({
        "id": "api.test.app_error",
        "message": message,
        "detailed_error": "",
        "request_id": "req",
        "status_code": status_code,
    })
    .to_string()
}

pub fn user(id: &str, username: &str) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        email: format!("{username}@example.org"),
        roles: "system_user".to_string(),
        ..User::default()
    }
}

/// Scripted Mattermost server.
#[derive(Default)]
pub struct FakeApi {
    pub me: User,
    pub pages: Vec<Vec<User>>,
    /// Status and body returned by `get_users` instead of a page.
    pub users_failure: Option<(u16, String)>,
    /// Usernames whose upload is refused with a 403.
    pub refuse_uploads_for: HashSet<String>,
    pub page_requests: RefCell<Vec<Pager>>,
    /// (user id, uploaded bytes)
    pub uploads: RefCell<Vec<(String, Vec<u8>)>>,
    pub posts: RefCell<Vec<Post>>,
}

impl FakeApi {
    pub fn with_pages(pages: Vec<Vec<User>>) -> Self {
        FakeApi {
            pages,
            ..FakeApi::default()
        }
    }

    fn username_of(&self, user_id: &str) -> Option<String> {
        self.pages
            .iter()
            .flatten()
            .find(|u| u.id == user_id)
            .map(|u| u.username.clone())
    }
}

impl MattermostApi for FakeApi {
    fn get_me(&self) -> Result<ApiResponse<User>, TransportError> {
        Ok(ApiResponse::new(200, serde_json::to_string(&self.me)?))
    }

    fn get_users(&self, pager: Pager) -> Result<ApiResponse<Vec<User>>, TransportError> {
        self.page_requests.borrow_mut().push(pager);
        if let Some((status, body)) = &self.users_failure {
            return Ok(ApiResponse::new(*status, body.clone()));
        }
        let page = self
            .pages
            .get(pager.page as usize)
            .cloned()
            .unwrap_or_default();
        Ok(ApiResponse::new(200, serde_json::to_string(&page)?))
    }

    fn set_profile_image(
        &self,
        user_id: &str,
        image: &Path,
    ) -> Result<ApiResponse<StatusOk>, TransportError> {
        let bytes = std::fs::read(image).map_err(|e| TransportError::io(image, e))?;
        self.uploads.borrow_mut().push((user_id.to_string(), bytes));
        let refused = self
            .username_of(user_id)
            .is_some_and(|name| self.refuse_uploads_for.contains(&name));
        if refused {
            let body = app_error(403, "You do not have the appropriate permissions.");
            return Ok(ApiResponse::new(403, body));
        }
        Ok(ApiResponse::new(200, r#"{"status":"OK"}"#))
    }

    fn create_post(&self, post: &Post) -> Result<ApiResponse<Post>, TransportError> {
        self.posts.borrow_mut().push(post.clone());
        let created = Post {
            id: Some("p1".to_string()),
            ..post.clone()
        };
        Ok(ApiResponse::new(201, serde_json::to_string(&created)?))
    }
}

/// Downloader that serves `content_for(url)` and records every request.
#[derive(Default)]
pub struct FakeDownloader {
    pub fetched: RefCell<Vec<Url>>,
    pub written: RefCell<Vec<PathBuf>>,
    /// URLs answered with a failure.
    pub failing: HashSet<String>,
}

impl FakeDownloader {
    pub fn content_for(url: &Url) -> Vec<u8> {
        format!("image bytes for {url}").into_bytes()
    }
}

impl Downloader for FakeDownloader {
    fn download_to(&self, url: &Url, dest: &Path) -> Result<u64, TransportError> {
        self.fetched.borrow_mut().push(url.clone());
        if self.failing.contains(url.as_str()) {
            return Err(TransportError::io(
                dest,
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            ));
        }
        let content = Self::content_for(url);
        std::fs::write(dest, &content).map_err(|e| TransportError::io(dest, e))?;
        self.written.borrow_mut().push(dest.to_path_buf());
        Ok(content.len() as u64)
    }
}
