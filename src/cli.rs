//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::config::MAX_PAGE_SIZE;

/// A collection of utilities for Mattermost
#[derive(Parser, Debug)]
#[command(name = "mattermost-utils")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Display detailed info
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Diagnostic logging on stderr (repeat for more)
    #[arg(long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Configuration file (default: <config dir>/mattermost-utils/config.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Display info on the authenticated user.
    #[command(visible_alias = "me")]
    WhoAmI {
        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Update users' profile pictures from an avatar service.
    #[command(name = "set-avatar", visible_alias = "sa")]
    SetAvatar(SetAvatarArgs),

    /// Post a message to a channel.
    #[command(visible_alias = "msg")]
    PostMessage {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Channel ID
        #[arg(short, long, default_value = "")]
        channel_id: String,

        /// Message text
        #[arg(short, long, default_value = "")]
        message_text: String,
    },

    /// Download a series of files
    #[command(visible_alias = "dl")]
    DownloadFiles(DownloadArgs),
}

/// Server address and credentials.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// API access token
    #[arg(short, long)]
    pub token: Option<String>,

    /// Mattermost address
    #[arg(short, long, value_hint = ValueHint::Url)]
    pub url: Option<String>,
}

/// Which user attribute keys the avatar service.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AvatarKey {
    #[default]
    Username,
    Email,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SetAvatarArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// The URL to the avatar service
    #[arg(short, long, value_hint = ValueHint::Url)]
    pub avatar_service_url: String,

    /// Force update avatar even if it had been setup by the user
    #[arg(short, long)]
    pub force: bool,

    /// User names to explicitly update
    #[arg(short, long = "include-user")]
    pub include_user: Vec<String>,

    /// User names to explicitly exclude from the update
    #[arg(short = 'x', long = "exclude-user")]
    pub exclude_user: Vec<String>,

    /// File listing user names to explicitly update, one per line
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub includelist: Option<PathBuf>,

    /// File listing user names to explicitly exclude from the update, one per line
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub excludelist: Option<PathBuf>,

    /// Dry run: profile images won't actually be updated
    #[arg(short, long)]
    pub dry_run: bool,

    /// User attribute appended to the avatar service URL
    #[arg(long, value_enum, default_value_t = AvatarKey::Username)]
    pub avatar_key: AvatarKey,

    /// Users fetched per page
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_PAGE_SIZE as i64))]
    pub page_size: Option<u32>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DownloadArgs {
    /// Template URL; `{i}` and `{i+1}` expand to the current index
    #[arg(short = 'u', long, value_hint = ValueHint::Url)]
    pub template_url: String,

    /// Output path template; same placeholders as the URL
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output_template: String,

    /// First index (inclusive)
    #[arg(short, long, default_value_t = 0)]
    pub from: i64,

    /// Last index (exclusive)
    #[arg(short, long, default_value_t = 1)]
    pub to: i64,
}
