use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "spritekey", version)]
struct Cli {
    /// Log per-frame keying statistics.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process every job of a batch (the built-in sprite list unless a manifest is given).
    Run(RunArgs),
    /// Process a single animation.
    Process(ProcessArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// JSON manifest listing the jobs to run.
    #[arg(long)]
    manifest: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ProcessArgs {
    /// Input animation.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output path prefix (defaults to the input path without its extension).
    #[arg(long)]
    out_prefix: Option<PathBuf>,

    /// Also write a frame-reversed animation.
    #[arg(long)]
    reverse: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match cli.cmd {
        Command::Run(args) => match args.manifest {
            Some(path) => spritekey::BatchConfig::from_path(&path)?,
            None => spritekey::BatchConfig::default_assets(),
        },
        Command::Process(args) => {
            let job = match args.out_prefix {
                Some(prefix) => spritekey::AssetJob::new(args.in_path, prefix, args.reverse),
                None => spritekey::AssetJob::from_input(args.in_path, args.reverse),
            };
            spritekey::BatchConfig::new(vec![job])
        }
    };

    // Per-job failures are reported in the log; the run itself still succeeds.
    let _report = spritekey::run_batch(&config);
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
