use clap::error::ErrorKind;
use clap::Parser;
use miette::Result;
use tilecut::cli::{self, Cli};
use tilecut::output::Printer;

fn main() -> Result<()> {
    // A bare invocation only prints the hint
    if std::env::args_os().len() <= 1 {
        eprintln!("{}", cli::usage_hint());
        return Ok(());
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => {
            eprintln!("{}", cli::usage_hint());
            return Ok(());
        }
    };

    if let Some(shell) = cli.completions {
        cli::completions::run(shell)?;
        return Ok(());
    }

    cli::convert::run(cli.convert_args()?, &Printer::new())?;

    Ok(())
}
