// API client module: a small blocking HTTP client for the Mattermost v4
// REST API. Every call hands back the raw `ApiResponse` so the caller
// picks its own error policy (see `response`).

use reqwest::blocking::{multipart, Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::config::{Settings, DEFAULT_PAGE_SIZE};
use crate::error::{CommandError, CommandResult, TransportError};
use crate::response::{ApiResponse, StatusPolicy};

const API_PREFIX: &str = "api/v4/";

/// A Mattermost account. Unknown properties are ignored, missing ones
/// take their default.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub roles: String,
    pub is_bot: bool,
    pub bot_description: Option<String>,
    /// Milliseconds since the epoch; zero until a picture is uploaded.
    pub last_picture_update: i64,
}

impl User {
    pub fn has_custom_avatar(&self) -> bool {
        self.last_picture_update != 0
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Post {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub channel_id: String,
    pub message: String,
}

impl Post {
    pub fn new(channel_id: impl Into<String>, message: impl Into<String>) -> Self {
        Post {
            id: None,
            channel_id: channel_id.into(),
            message: message.into(),
        }
    }
}

/// Body of calls that only acknowledge, e.g. `{"status": "OK"}`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StatusOk {
    pub status: String,
}

/// Position in a paged listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pager {
    fn default() -> Self {
        Pager::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(per_page: u32) -> Self {
        Pager { page: 0, per_page }
    }

    pub fn next_page(self) -> Self {
        Pager {
            page: self.page + 1,
            ..self
        }
    }
}

/// The remote calls the subcommands rely on.
pub trait MattermostApi {
    fn get_me(&self) -> Result<ApiResponse<User>, TransportError>;

    fn get_users(&self, pager: Pager) -> Result<ApiResponse<Vec<User>>, TransportError>;

    fn set_profile_image(
        &self,
        user_id: &str,
        image: &Path,
    ) -> Result<ApiResponse<StatusOk>, TransportError>;

    fn create_post(&self, post: &Post) -> Result<ApiResponse<Post>, TransportError>;
}

/// Blocking client bound to one server and one access token.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    policy: StatusPolicy,
}

impl ApiClient {
    /// Builds a client from resolved settings. A malformed server URL or
    /// token is an invalid argument.
    pub fn new(settings: &Settings) -> CommandResult<Self> {
        let mut base_url = Url::parse(&settings.url)?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(CommandError::invalid_argument(format!(
                "not an http(s) server address: {}",
                settings.url
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let base_url = base_url.join(API_PREFIX)?;

        let client = Client::builder()
            .default_headers(auth_headers(&settings.token)?)
            .timeout(settings.timeout)
            .build()
            .map_err(TransportError::from)?;

        Ok(ApiClient {
            client,
            base_url,
            policy: settings.status_policy,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn wrap<T>(&self, response: Response) -> Result<ApiResponse<T>, TransportError> {
        let status = response.status().as_u16();
        let body = response.text()?;
        tracing::debug!(status, "response received");
        Ok(ApiResponse::new(status, body).with_policy(self.policy))
    }
}

/// Bearer header for the token, marked sensitive; no header when empty.
fn auth_headers(token: &str) -> CommandResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    if token.is_empty() {
        return Ok(headers);
    }
    let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
        CommandError::invalid_argument("access token contains characters not allowed in a header")
    })?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

impl MattermostApi for ApiClient {
    fn get_me(&self) -> Result<ApiResponse<User>, TransportError> {
        let url = self.endpoint(&["users", "me"]);
        tracing::debug!(%url, "GET");
        let res = self.client.get(url).send()?;
        self.wrap(res)
    }

    fn get_users(&self, pager: Pager) -> Result<ApiResponse<Vec<User>>, TransportError> {
        let url = self.endpoint(&["users"]);
        tracing::debug!(%url, page = pager.page, per_page = pager.per_page, "GET");
        let res = self
            .client
            .get(url)
            .query(&[("page", pager.page), ("per_page", pager.per_page)])
            .send()?;
        self.wrap(res)
    }

    fn set_profile_image(
        &self,
        user_id: &str,
        image: &Path,
    ) -> Result<ApiResponse<StatusOk>, TransportError> {
        let url = self.endpoint(&["users", user_id, "image"]);
        tracing::debug!(%url, image = %image.display(), "POST");
        let form = multipart::Form::new()
            .file("image", image)
            .map_err(|e| TransportError::io(image, e))?;
        let res = self.client.post(url).multipart(form).send()?;
        self.wrap(res)
    }

    fn create_post(&self, post: &Post) -> Result<ApiResponse<Post>, TransportError> {
        let url = self.endpoint(&["posts"]);
        tracing::debug!(%url, channel_id = %post.channel_id, "POST");
        let res = self.client.post(url).json(post).send()?;
        self.wrap(res)
    }
}
