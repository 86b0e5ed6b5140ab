use std::io::Write;

use clap::{Args, Command};
use clap_complete::{Shell, generate};

/// Binary name the generated script completes.
pub const BIN_NAME: &str = "graphgate";

/// Arguments for `graphgate completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script generation.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `command` to `out`.
pub fn run_completions(args: &CompletionsArgs, mut command: Command, out: &mut dyn Write) {
    generate(args.shell, &mut command, BIN_NAME, out);
}
