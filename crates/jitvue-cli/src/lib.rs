mod cmd;

use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(name = "jitvue", version, about = "jitvue - run compiled Vue components without a module loader")]
struct Cli {
    /// Log transform decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the transformed function body for a component
    Transform(cmd::SourceArgs),
    /// Print nested-scope names, require sites, bindings and available modules as JSON
    Inspect(cmd::SourceArgs),
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_max_level(level)
        .init();
}

pub fn run() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Transform(args) => cmd::transform::run(&args),
        Commands::Inspect(args) => cmd::inspect::run(&args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
