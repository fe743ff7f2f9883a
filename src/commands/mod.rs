//! Command dispatch: one match over the subcommands, one place where
//! failures turn into exit codes.

pub mod download_files;
pub mod post_message;
pub mod set_avatar;
pub mod who_am_i;

use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::Context;

use crate::api::ApiClient;
use crate::cli::{Command, ConnectionArgs};
use crate::config::{FileConfig, Settings};
use crate::error::{CommandError, CommandResult};
use crate::exitcode;
use crate::transfer::HttpDownloader;
use crate::ui::{self, Console};

/// Runs `command` to completion and returns the process exit code.
///
/// `config` is only read by the subcommands that talk to the server.
pub fn execute(command: &Command, config: Option<&Path>, console: &mut Console) -> i32 {
    let result = dispatch(command, config, console);
    finish(result, console)
}

fn dispatch(
    command: &Command,
    config: Option<&Path>,
    console: &mut Console,
) -> CommandResult<()> {
    match command {
        Command::WhoAmI { connection } => {
            let settings = settings_for(connection, config, console)?;
            let client = ApiClient::new(&settings)?;
            who_am_i::run(&client, console).map(|_| ())
        }
        Command::SetAvatar(args) => {
            let settings = settings_for(&args.connection, config, console)?;
            let client = ApiClient::new(&settings)?;
            let downloader = HttpDownloader::new(Some(settings.timeout))?;
            let page_size = args.page_size.unwrap_or(settings.page_size);
            set_avatar::run(args, page_size, &client, &downloader, console).map(|_| ())
        }
        Command::PostMessage {
            connection,
            channel_id,
            message_text,
        } => {
            let settings = settings_for(connection, config, console)?;
            let client = ApiClient::new(&settings)?;
            post_message::run(&client, channel_id, message_text, console)
        }
        Command::DownloadFiles(args) => {
            let downloader = HttpDownloader::new(None)?;
            download_files::run(args, &downloader, console).map(|_| ())
        }
    }
}

/// Flags over config file over defaults; prompts for a missing token on a terminal.
fn settings_for(
    connection: &ConnectionArgs,
    config: Option<&Path>,
    console: &Console,
) -> CommandResult<Settings> {
    let file = FileConfig::load(config)
        .map_err(|e| CommandError::invalid_argument(format!("{e:#}")))?;
    let mut settings = Settings::resolve(
        &file,
        connection.url.as_deref(),
        connection.token.as_deref(),
    );
    if settings.token.is_empty() && console.is_interactive() && io::stdin().is_terminal() {
        settings.token = ui::prompt_token().context("Failed to read access token")?;
    }
    tracing::debug!(url = %settings.url, policy = ?settings.status_policy, "settings resolved");
    Ok(settings)
}

/// Reports a failure and maps it to its exit code.
pub fn finish(result: CommandResult<()>, console: &mut Console) -> i32 {
    match result {
        Ok(()) => exitcode::OK,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            match e.headline() {
                Some(headline) => console.exception_with(headline, &e),
                None => console.exception(&e),
            }
            e.exit_code()
        }
    }
}

