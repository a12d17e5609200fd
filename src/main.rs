use gershwin::runtime::{
    error::{self, ErrorKind, ScriptError},
    interpreter::{driver, repl::run_repl, Config, Runtime},
};
use std::{
    env::{args, var},
    io::{stdin, stdout},
    path::PathBuf,
};
use tracing::debug;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Environment variable holding the log filter directives.
const LOG_VAR: &str = "GERSHWIN_LOG";

const USAGE: &str = "\
Usage: gershwin                                         Start the interactive REPL.
       gershwin <file>                                  Load and run a source file.
       gershwin --compile [--compile-path <dir>] <file> Compile a source file to host code.";

/// What the command line asked for.
enum Command {
    Repl,
    Load(PathBuf),
    Compile(PathBuf),
    Help,
}

fn usage_error<T>(message: &str) -> error::Result<T> {
    ScriptError::new_as_result(ErrorKind::Config, None, format!("{}\n{}", message, USAGE))
}

fn parse_args(mut args: impl Iterator<Item = String>, mut config: Config) -> error::Result<(Command, Config)> {
    let mut compile = false;
    let mut source = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok((Command::Help, config)),
            "--compile" => compile = true,

            "--compile-path" => match args.next() {
                Some(path) => config = config.with_compile_path(path),
                None => return usage_error("--compile-path needs a directory."),
            },

            _ if arg.starts_with("--") => return usage_error(&format!("Unknown option {}.", arg)),

            _ if source.is_none() => source = Some(PathBuf::from(arg)),
            _ => return usage_error("Only one source file can be given."),
        }
    }

    let command = match (compile, source) {
        (true, Some(path)) => Command::Compile(path),
        (true, None) => return usage_error("--compile needs a source file."),
        (false, Some(path)) => Command::Load(path),
        (false, None) => Command::Repl,
    };

    Ok((command, config))
}

fn init_tracing() {
    let env = var(LOG_VAR).unwrap_or_default();
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(env);

    let _res = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

fn main() -> error::Result<()> {
    init_tracing();

    let (command, config) = parse_args(args().skip(1), Config::from_env())?;
    let mut runtime = Runtime::with_config(config);

    match command {
        Command::Help => println!("{}", USAGE),

        Command::Repl => {
            let input = stdin().lock();
            let mut output = stdout();

            run_repl(&mut runtime, input, &mut output)?;
        }

        Command::Load(path) => {
            let _ = driver::load_file(&mut runtime, &path)?;
        }

        Command::Compile(path) => {
            let artifact = driver::compile_file(&mut runtime, &path)?;
            debug!(artifact = %artifact.display(), "Compiled.");
        }
    }

    Ok(())
}
