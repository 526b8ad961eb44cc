use clap::Parser;

use talos::{
    cli::{Args, Command},
    command,
};

fn initialize_logger(debug: bool) -> talos::Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("talos")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli_args = Args::parse();

    initialize_logger(cli_args.debug)?;

    match &cli_args.command {
        Command::Run { report } => {
            command::run::execute(&cli_args, report).await?
        }
        Command::ChangelogHead { descriptor } => {
            command::changelog_head::execute(&cli_args, descriptor)?
        }
        Command::Bump { kind, packages } => {
            command::bump::execute(&cli_args, *kind, packages)?
        }
    }

    Ok(())
}
