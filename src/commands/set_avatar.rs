//! `set-avatar`: pages through every user and uploads a picture fetched
//! from an avatar service.
//!
//! A failure on one user is reported and the run moves on to the next;
//! only a failure to list users aborts the whole command.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use url::Url;

use crate::api::{MattermostApi, Pager, User};
use crate::cli::{AvatarKey, SetAvatarArgs};
use crate::error::{CommandError, CommandResult, TransportError};
use crate::transfer::Downloader;
use crate::ui::Console;

const TEMP_PREFIX: &str = "userImg";

/// Which usernames a run may touch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    include: HashSet<String>,
    exclude: HashSet<String>,
}

impl UserFilter {
    pub fn new(
        include: impl IntoIterator<Item = String>,
        exclude: impl IntoIterator<Item = String>,
    ) -> Self {
        UserFilter {
            include: include.into_iter().collect(),
            exclude: exclude.into_iter().collect(),
        }
    }

    /// Inline names plus the contents of the list files.
    pub fn from_args(args: &SetAvatarArgs) -> CommandResult<Self> {
        let mut include = args.include_user.clone();
        if let Some(path) = &args.includelist {
            include.extend(read_user_list(path)?);
        }
        let mut exclude = args.exclude_user.clone();
        if let Some(path) = &args.excludelist {
            exclude.extend(read_user_list(path)?);
        }
        Ok(UserFilter::new(include, exclude))
    }

    /// Excluded names never pass; a non-empty include list admits only its members.
    pub fn admits(&self, username: &str) -> bool {
        !self.exclude.contains(username)
            && (self.include.is_empty() || self.include.contains(username))
    }
}

/// One username per line; surrounding blanks and empty lines are dropped.
pub fn read_user_list(path: &Path) -> CommandResult<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CommandError::invalid_argument(format!("cannot read user list {}: {e}", path.display()))
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// `service` with `key` appended as a single, encoded path segment.
pub fn avatar_url(service: &Url, key: &str) -> CommandResult<Url> {
    let mut url = service.clone();
    url.path_segments_mut()
        .map_err(|_| {
            CommandError::invalid_argument(format!(
                "avatar service URL cannot take a path: {service}"
            ))
        })?
        .pop_if_empty()
        .push(key);
    Ok(url)
}

#[derive(Debug, Clone, PartialEq)]
pub enum AvatarOutcome {
    Updated { image: PathBuf },
    DryRun { image: PathBuf },
    /// The user already set a picture and `--force` was not given.
    Skipped,
    /// The server refused the upload.
    Rejected,
    Failed { reason: String },
}

/// Outcome of every user the filter admitted, in processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvatarReport {
    pub outcomes: Vec<(String, AvatarOutcome)>,
}

impl AvatarReport {
    fn count(&self, pred: impl Fn(&AvatarOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, AvatarOutcome::Updated { .. }))
    }

    pub fn dry_run(&self) -> usize {
        self.count(|o| matches!(o, AvatarOutcome::DryRun { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, AvatarOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, AvatarOutcome::Rejected | AvatarOutcome::Failed { .. }))
    }

    pub fn outcome(&self, username: &str) -> Option<&AvatarOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == username)
            .map(|(_, o)| o)
    }
}

struct AvatarRun<'a> {
    args: &'a SetAvatarArgs,
    service: Url,
    api: &'a dyn MattermostApi,
    downloader: &'a dyn Downloader,
    /// Downloaded images, removed when the run ends. Paths only, so no
    /// file handle stays open per user.
    staged: Vec<TempPath>,
}

pub fn run(
    args: &SetAvatarArgs,
    page_size: u32,
    api: &dyn MattermostApi,
    downloader: &dyn Downloader,
    console: &mut Console,
) -> CommandResult<AvatarReport> {
    let filter = UserFilter::from_args(args)?;
    let service = Url::parse(&args.avatar_service_url)?;
    let mut avatars = AvatarRun {
        args,
        service,
        api,
        downloader,
        staged: Vec::new(),
    };
    let mut report = AvatarReport::default();

    let mut pager = Pager::new(page_size);
    loop {
        let users = fetch_users(api, pager, console)?;
        if users.is_empty() {
            break;
        }
        console.debug(format!("Processing users (page {})", pager.page));
        for user in users.iter().filter(|u| filter.admits(&u.username)) {
            let outcome = avatars.process(user, console);
            tracing::info!(user = %user.username, ?outcome, "avatar processed");
            report.outcomes.push((user.username.clone(), outcome));
        }
        pager = pager.next_page();
    }

    console.message(format!(
        "{} updated, {} dry run, {} skipped, {} failed",
        report.updated(),
        report.dry_run(),
        report.skipped(),
        report.failed()
    ));
    Ok(report)
}

fn fetch_users(
    api: &dyn MattermostApi,
    pager: Pager,
    console: &Console,
) -> CommandResult<Vec<User>> {
    let spinner = console.spinner(format!("Fetching users (page {})", pager.page));
    let response = api.get_users(pager);
    spinner.finish_and_clear();
    response?.entity()
}

impl AvatarRun<'_> {
    fn process(&mut self, user: &User, console: &mut Console) -> AvatarOutcome {
        if !self.args.force && user.has_custom_avatar() {
            console.debug(format!("Skip update for user {}", user.username));
            return AvatarOutcome::Skipped;
        }
        console.value(&user.username);
        match self.update(user, console) {
            Ok(outcome) => outcome,
            Err(e) => {
                console.error(format!(
                    "Failed to recover profile image for user {}",
                    user.username
                ));
                console.exception(&e);
                AvatarOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn update(&mut self, user: &User, console: &mut Console) -> CommandResult<AvatarOutcome> {
        let key = match self.args.avatar_key {
            AvatarKey::Username => &user.username,
            AvatarKey::Email => &user.email,
        };
        if key.is_empty() {
            return Err(CommandError::invalid_argument(format!(
                "user {} has no {:?} to look up",
                user.username, self.args.avatar_key
            )));
        }
        let url = avatar_url(&self.service, key)?;

        let image = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile()
            .map_err(|e| TransportError::io(std::env::temp_dir(), e))?;
        let image = image.into_temp_path();
        let path = image.to_path_buf();
        self.staged.push(image);

        self.downloader.download_to(&url, &path)?;
        console.debug(format!("Profile image saved to {}", path.display()));

        if self.args.dry_run {
            console.message(format!(
                "[Dry run: nothing happened] Updated {} with image at {}",
                user.username,
                path.display()
            ));
            return Ok(AvatarOutcome::DryRun { image: path });
        }

        let response = self.api.set_profile_image(&user.id, &path)?;
        if response.check_for_api_error(console) {
            return Ok(AvatarOutcome::Rejected);
        }
        console.message(format!(
            "Updated {} with image at {}",
            user.username,
            path.display()
        ));
        Ok(AvatarOutcome::Updated { image: path })
    }
}
