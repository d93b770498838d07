//! Shell completions generation.

use clap_complete::Shell;

/// Write completions for `shell` to stdout.
pub fn run(shell: Shell) -> crate::error::Result<()> {
    let mut cmd = <super::Cli as clap::CommandFactory>::command();
    clap_complete::generate(shell, &mut cmd, "tilecut", &mut std::io::stdout());
    Ok(())
}
