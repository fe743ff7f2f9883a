//! `download-files`: copies a numbered series of remote files.

use std::path::PathBuf;

use url::Url;

use crate::cli::DownloadArgs;
use crate::error::CommandResult;
use crate::transfer::Downloader;
use crate::ui::Console;

/// Expands `{i}` to `i` and `{i+1}` to `i + 1`.
pub fn expand(template: &str, i: i64) -> String {
    template
        .replace("{i}", &i.to_string())
        .replace("{i+1}", &(i + 1).to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    Copied { path: PathBuf, bytes: u64 },
    Failed { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadReport {
    pub items: Vec<(i64, DownloadOutcome)>,
}

impl DownloadReport {
    pub fn copied(&self) -> usize {
        self.items
            .iter()
            .filter(|(_, o)| matches!(o, DownloadOutcome::Copied { .. }))
            .count()
    }
}

pub fn run(
    args: &DownloadArgs,
    downloader: &dyn Downloader,
    console: &mut Console,
) -> CommandResult<DownloadReport> {
    let mut report = DownloadReport::default();
    if args.from >= args.to {
        console.debug(format!("Empty range {}..{}", args.from, args.to));
        return Ok(report);
    }

    let bar = console.progress_bar(args.to.abs_diff(args.from));
    for i in args.from..args.to {
        let outcome = match copy_one(args, i, downloader, console, &bar) {
            Ok((path, bytes)) => DownloadOutcome::Copied { path, bytes },
            Err(e) => {
                bar.suspend(|| console.exception(&e));
                DownloadOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        tracing::debug!(index = i, ?outcome, "download processed");
        report.items.push((i, outcome));
        bar.inc(1);
    }
    bar.finish_and_clear();
    Ok(report)
}

fn copy_one(
    args: &DownloadArgs,
    i: i64,
    downloader: &dyn Downloader,
    console: &mut Console,
    bar: &indicatif::ProgressBar,
) -> CommandResult<(PathBuf, u64)> {
    let url = Url::parse(&expand(&args.template_url, i))?;
    let destination = PathBuf::from(expand(&args.output_template, i));
    bar.suspend(|| console.key_value(&url, destination.display()));
    let bytes = downloader.download_to(&url, &destination)?;
    console.debug(format!("{bytes} bytes written to {}", destination.display()));
    Ok((destination, bytes))
}
