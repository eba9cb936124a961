use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tilisp::{Config, Environment, Mode, repl};
use tracing::Level;

/// Evaluate or compile parenthesized arithmetic for the TI-83 Plus.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
  /// Source file holding a single expression
  #[arg(required_unless_present = "repl")]
  file: Option<PathBuf>,

  /// Start a REPL instead of reading FILE
  #[arg(long)]
  repl: bool,

  /// Compile FILE to Z80 assembly
  #[arg(long, conflicts_with = "tokens")]
  compile: bool,

  /// Print the token stream instead of evaluating
  #[arg(long)]
  tokens: bool,

  /// Print the symbol table and parsed tree before the result
  #[arg(long)]
  debug: bool,

  /// One of `TRACE`, `DEBUG`, `INFO`, `WARN`, or `ERROR`
  #[arg(short, long, env = "TILISP_LOG", default_value_t = Level::WARN)]
  log_level: Level,
}

impl Args {
  fn config(&self) -> Config {
    let mode = if self.compile {
      Mode::Compile
    } else if self.tokens {
      Mode::Tokens
    } else {
      Mode::Value
    };
    Config {
      mode,
      debug: self.debug,
      ..Config::default()
    }
  }
}

fn main() -> ExitCode {
  let args = Args::parse();
  tracing_subscriber::fmt()
    .with_max_level(args.log_level)
    .with_writer(io::stderr)
    .init();

  let config = args.config();
  let mut env = Environment::new();

  // clap only lets FILE be absent together with --repl.
  let Some(path) = args.file.as_ref().filter(|_| !args.repl) else {
    let stdin = io::stdin();
    return match repl::run(&mut env, &config, stdin.lock(), io::stdout()) {
      Ok(()) => ExitCode::SUCCESS,
      Err(err) => {
        tracing::error!("{err}");
        ExitCode::FAILURE
      }
    };
  };

  // Invalid UTF-8 surfaces as an illegal character, not as a read failure.
  let source = match fs::read(path) {
    Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
    Err(err) => {
      eprintln!("cannot read {}: {err}", path.display());
      return ExitCode::FAILURE;
    }
  };

  match tilisp::evaluate(&mut env, &source, &config) {
    Ok(output) => {
      println!("{}", output.trim_end_matches('\n'));
      ExitCode::SUCCESS
    }
    Err(err) => {
      eprintln!("{err}");
      ExitCode::FAILURE
    }
  }
}
