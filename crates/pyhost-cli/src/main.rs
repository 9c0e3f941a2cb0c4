use clap::{Parser, Subcommand};
use pyhost::{
    commands::{
        config::{self, ConfigAction},
        python,
    },
    errors::CliError,
    logger, GlobalOpts,
};
use pyhost_config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pyhost")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Embedded Python bridge",
    long_about = "pyhost starts an embedded Python interpreter once and inspects values through it."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start Python and report its state, version and search path
    Status {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve a module by absolute name and print its repr
    Import {
        module: String,
        /// Dotted attribute path to resolve on the module (e.g. path.join)
        #[arg(long)]
        attr: Option<String>,
    },
    /// Print the builtins namespace, or one of its members
    Builtins { name: Option<String> },
    /// Evaluate an expression and print its repr
    Eval { expr: String },
    /// Manage the pyhost configuration file
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    let verbosity = cli.global.verbosity_level();

    init_tracing(verbosity);

    let log_file = Config::load()
        .ok()
        .and_then(|cfg| cfg.log_file)
        .map(PathBuf::from);
    if let Err(e) = logger::init(verbosity, cli.global.quiet, log_file) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    let result = match cli.command {
        Commands::Status { json } => python::handle_status(json, &cli.global),
        Commands::Import { module, attr } => {
            python::handle_import(&module, attr.as_deref(), &cli.global)
        }
        Commands::Builtins { name } => python::handle_builtins(name.as_deref(), &cli.global),
        Commands::Eval { expr } => python::handle_eval(&expr, &cli.global),
        Commands::Config { action } => config::handle_config(action, &cli.global),
    };

    if let Err(e) = result {
        report(&e);
        std::process::exit(1);
    }
}

fn report(err: &CliError) {
    logger::error(&err.to_string());
    if let Some(traceback) = err.traceback() {
        eprint!("{}", traceback);
    }
}
