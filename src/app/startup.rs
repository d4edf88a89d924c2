use crate::app::cli::{Args, Command};
use crate::app::commands;
use crate::app::error::{CliError, CliResult};
use crate::config::EngineConfig;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::styles::{palette_to_clap, StyleRole};
use clap::{CommandFactory, FromArgMatches};

/// Parse arguments, load configuration, install logging and run the command
pub fn startup() {
    let args = parse_args();
    let use_color = args.use_color();

    let (config, config_path) = match EngineConfig::load(args.config_file.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{} {}", StyleRole::Error.paint("error:", use_color), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(
        Some(args.log_level(&config)),
        args.log_format(&config),
        args.log_file(&config),
        use_color,
    ) {
        eprintln!(
            "{} {}",
            StyleRole::Error.paint("error:", use_color),
            CliError::Logging(e.to_string())
        );
        std::process::exit(1);
    }

    match &config_path {
        Some(path) => log::debug!("Using configuration {}", path.display()),
        None => log::debug!("No configuration file, using defaults"),
    }

    if let Err(e) = run(&args, &config) {
        log_error_with_context(&e, &format!("dstate {} failed", command_name(&args.command)));
        std::process::exit(1);
    }
}

fn parse_args() -> Args {
    let color = !std::env::args().any(|arg| arg == "--no-color");
    let matches = Args::command()
        .styles(palette_to_clap(color))
        .get_matches();
    match Args::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(e) => e.exit(),
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Inspect { .. } => "inspect",
        Command::Dump { .. } => "dump",
        Command::Buckets { .. } => "buckets",
        Command::Version => "version",
    }
}

/// Execute one subcommand against a loaded configuration
pub fn run(args: &Args, config: &EngineConfig) -> CliResult<()> {
    let bits = args.block_size(config);
    let color = args.use_color();
    log::trace!("Running {} with block size {}", command_name(&args.command), bits);

    match &args.command {
        Command::Inspect { file } => {
            commands::emit(&commands::inspect(file, bits)?, args.format, color)
        }
        Command::Dump { file, owner } => {
            commands::emit(&commands::dump(file, bits, *owner)?, args.format, color)
        }
        Command::Buckets { file } => {
            commands::emit(&commands::buckets(file, bits)?, args.format, color)
        }
        Command::Version => commands::emit(&commands::version(), args.format, color),
    }
}
