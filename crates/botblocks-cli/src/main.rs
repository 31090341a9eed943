mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{program::ProgramSubcommand, rainbow::RainbowSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "botblocks",
    about = "Build robot programs from blocks and run them against the robot's HTTP API",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .botblocks/ or .git/)
    #[arg(long, global = true, env = "BOTBLOCKS_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Robot base URL (overrides .botblocks/config.yaml)
    #[arg(long, global = true, env = "BOTBLOCKS_URL")]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .botblocks/ with a default config and an empty program
    Init,

    /// Edit the program
    Program {
        /// Program file (default: .botblocks/program.yaml)
        #[arg(long)]
        file: Option<PathBuf>,

        #[command(subcommand)]
        subcommand: ProgramSubcommand,
    },

    /// Run the program against the robot, printing each request as it goes
    Run {
        /// Program file (default: .botblocks/program.yaml)
        #[arg(long)]
        program: Option<PathBuf>,
    },

    /// Drive the LED ring's rainbow effect directly
    Rainbow {
        #[command(subcommand)]
        subcommand: RainbowSubcommand,
    },

    /// Print the program as a script
    Script {
        /// Program file (default: .botblocks/program.yaml)
        #[arg(long)]
        program: Option<PathBuf>,
    },

    /// Start the HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "3142")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let url = cli.url.as_deref();

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, url),
        Commands::Program { file, subcommand } => {
            cmd::program::run(&root, file.as_deref(), subcommand, cli.json)
        }
        Commands::Run { program } => cmd::run::run(&root, program.as_deref(), url, cli.json),
        Commands::Rainbow { subcommand } => cmd::rainbow::run(&root, subcommand, url, cli.json),
        Commands::Script { program } => cmd::script::run(&root, program.as_deref(), cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, url, port),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
