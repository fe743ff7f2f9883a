// UI layer: everything the user reads goes through `Console`.
// - Status messages and values go to stdout, errors to stderr.
// - Debug lines and cause chains only show up in verbose mode.
// - Progress indicators (indicatif) are only drawn on a terminal.
// - The only interactive prompt left is the access token (dialoguer).

use crossterm::style::{Color, Stylize};
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

const DEBUG_COLOR: Color = Color::AnsiValue(238);

/// Output sink for human-readable status, value, error and debug lines.
///
/// The verbosity flag is fixed at construction and travels with the
/// console into every subcommand.
pub struct Console {
    verbose: bool,
    color: bool,
    err_color: bool,
    interactive: bool,
    out: Box<dyn Write>,
    err: Box<dyn Write>,
}

impl Console {
    /// Console over the process' stdout/stderr. Each stream is colored only
    /// when it is a terminal; progress indicators follow stdout.
    pub fn stdio(verbose: bool) -> Self {
        let tty = io::stdout().is_terminal();
        Console {
            verbose,
            color: tty,
            err_color: io::stderr().is_terminal(),
            interactive: tty,
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
        }
    }

    /// Console over arbitrary writers. Never colored, never interactive.
    pub fn with_writers(
        verbose: bool,
        out: impl Write + 'static,
        err: impl Write + 'static,
    ) -> Self {
        Console {
            verbose,
            color: false,
            err_color: false,
            interactive: false,
            out: Box::new(out),
            err: Box::new(err),
        }
    }

    /// Overrides coloring per stream.
    pub fn with_color(mut self, out: bool, err: bool) -> Self {
        self.color = out;
        self.err_color = err;
        self
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Status line (bold blue).
    pub fn message(&mut self, value: impl Display) {
        let line = if self.color {
            value.to_string().bold().blue().to_string()
        } else {
            value.to_string()
        };
        let _ = writeln!(self.out, "{line}");
    }

    /// Data line (magenta).
    pub fn value(&mut self, value: impl Display) {
        let line = if self.color {
            value.to_string().magenta().to_string()
        } else {
            value.to_string()
        };
        let _ = writeln!(self.out, "{line}");
    }

    /// `"<key>: <value>"`, key styled as a message and value as a value.
    pub fn key_value(&mut self, key: impl Display, value: impl Display) {
        let key = format!("{key}: ");
        let value = value.to_string();
        if self.color {
            let _ = writeln!(self.out, "{}{}", key.bold().blue(), value.magenta());
        } else {
            let _ = writeln!(self.out, "{key}{value}");
        }
    }

    /// Error line (red) on the error stream.
    pub fn error(&mut self, msg: impl Display) {
        let line = if self.err_color {
            msg.to_string().red().to_string()
        } else {
            msg.to_string()
        };
        let _ = writeln!(self.err, "{line}");
    }

    /// Reports an error; verbose mode adds its cause chain.
    pub fn exception(&mut self, err: &(dyn Error + 'static)) {
        self.error(err);
        self.cause_chain(err);
    }

    /// Like [`Console::exception`] with a leading context line.
    pub fn exception_with(&mut self, context: &str, err: &(dyn Error + 'static)) {
        self.error(context);
        self.exception(err);
    }

    /// Diagnostic line, printed only in verbose mode.
    pub fn debug(&mut self, msg: impl Display) {
        if !self.verbose {
            return;
        }
        let line = if self.color {
            msg.to_string().with(DEBUG_COLOR).to_string()
        } else {
            msg.to_string()
        };
        let _ = writeln!(self.out, "{line}");
    }

    fn cause_chain(&mut self, err: &(dyn Error + 'static)) {
        let mut source = err.source();
        while let Some(cause) = source {
            self.debug(format!("Caused by: {cause}"));
            source = cause.source();
        }
    }

    /// Spinner with a message; a no-op bar when not interactive.
    pub fn spinner(&self, msg: impl Into<String>) -> ProgressBar {
        if !self.interactive {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(msg.into());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    /// Bounded progress bar; a no-op bar when not interactive.
    pub fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.interactive {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
            bar.set_style(style);
        }
        bar
    }
}

/// Asks for the access token with hidden input.
pub fn prompt_token() -> io::Result<String> {
    Password::new()
        .with_prompt("API access token")
        .allow_empty_password(true)
        .interact()
}
