// cli/src/main.rs
use ankibridge_cli::args::Args;
use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging based on verbosity; stdout is reserved for JSON.
    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("ankibridge_core={level}").parse()?)
                .add_directive(format!("ankibridge_cli={level}").parse()?),
        )
        .init();

    let output = ankibridge_cli::run(args)?;
    println!("{output}");
    Ok(())
}
