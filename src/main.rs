use clap::Parser;
use gbaphase::{
    cli::{init_verbose, Cli, Command, FULL_VERSION},
    commands::{call, phase},
    utils::{handle_error_and_exit, Result},
};

fn runner() -> Result<()> {
    let cli = Cli::parse();
    init_verbose(&cli);
    let subcommand_name = match cli.command {
        Command::Call(_) => "call",
        Command::Phase(_) => "phase",
    };

    log::info!(
        "Running {}-{} [{}]",
        env!("CARGO_PKG_NAME"),
        *FULL_VERSION,
        subcommand_name
    );
    match cli.command {
        Command::Call(args) => call::call(args)?,
        Command::Phase(args) => phase::phase(args)?,
    }
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
