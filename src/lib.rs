// Library root
// ------------
// The binary (`main.rs`) only parses arguments, sets up logging and
// hands the chosen subcommand to `commands::execute`.
//
// Module responsibilities:
// - `api`: Mattermost v4 client and the models it exchanges.
// - `response`: result wrapper around raw API responses and the two
//   error checks (report-and-continue, abort).
// - `error` / `exitcode`: error taxonomy and how it maps to exit codes.
// - `transfer`: plain byte-for-byte downloads.
// - `commands`: one module per subcommand plus the dispatcher.
// - `cli`, `config`, `logging`, `ui`: argument parsing, settings,
//   diagnostics and the console sink.
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exitcode;
pub mod logging;
pub mod response;
pub mod transfer;
pub mod ui;
