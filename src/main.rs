// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, run one
//   subcommand, exit with its code. Settings are loaded by the
//   subcommands that need them.

use clap::{CommandFactory, Parser};

use mattermost_utils::cli::Cli;
use mattermost_utils::commands;
use mattermost_utils::exitcode;
use mattermost_utils::logging::setup_logging;
use mattermost_utils::ui::Console;

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    let mut console = Console::stdio(cli.verbose);

    let Some(command) = &cli.command else {
        let _ = Cli::command().print_help();
        std::process::exit(exitcode::OK);
    };

    let code = commands::execute(command, cli.config.as_deref(), &mut console);
    std::process::exit(code);
}
