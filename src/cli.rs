// src/cli.rs
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf};

use crate::core::config::{DEFAULT_CONFIG_FILE, DEFAULT_ENV_CONFIG_FILE};
use crate::core::suite::DEFAULT_SUITE_FILE;
use crate::core::variant::{BuildKind, FsKind, TestType};
use crate::infra::t;

pub mod commands;

use commands::run::RunArgs;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` argument.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|arg| arg == "--lang")
        .and_then(|pos| args.get(pos + 1))
        .cloned()
}

pub fn build_cli(locale: &str) -> Command {
    Command::new("pmtest-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli_about", locale = locale).to_string())
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli_lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about(t!("cmd_run_about", locale = locale).to_string())
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help(t!("arg_config", locale = locale).to_string())
                        .value_name("CONFIG")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("suite")
                        .short('s')
                        .long("suite")
                        .help(t!("arg_suite", locale = locale).to_string())
                        .value_name("SUITE")
                        .default_value(DEFAULT_SUITE_FILE)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("envconfig")
                        .long("envconfig")
                        .help(t!("arg_envconfig", locale = locale).to_string())
                        .value_name("ENVCONFIG")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("build")
                        .short('b')
                        .long("build")
                        .help(t!("arg_build", locale = locale).to_string())
                        .value_name("BUILD")
                        .value_parser(|s: &str| s.parse::<BuildKind>())
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("fs")
                        .short('f')
                        .long("fs")
                        .help(t!("arg_fs", locale = locale).to_string())
                        .value_name("FS")
                        .value_parser(|s: &str| s.parse::<FsKind>())
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("test-type")
                        .short('t')
                        .long("test-type")
                        .help(t!("arg_test_type", locale = locale).to_string())
                        .value_name("TEST_TYPE")
                        .value_parser(|s: &str| s.parse::<TestType>())
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("test-sequence")
                        .short('u')
                        .long("test-sequence")
                        .help(t!("arg_sequence", locale = locale).to_string())
                        .value_name("TESTNUM")
                        .value_delimiter(',')
                        .value_parser(clap::value_parser!(u32))
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("timeout")
                        .short('o')
                        .long("timeout")
                        .help(t!("arg_timeout", locale = locale).to_string())
                        .value_name("SECONDS")
                        .value_parser(clap::value_parser!(u64))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("log-level")
                        .short('l')
                        .long("log-level")
                        .help(t!("arg_log_level", locale = locale).to_string())
                        .value_name("LEVEL")
                        .value_parser(clap::value_parser!(u8).range(0..=2))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cmd_init_about", locale = locale).to_string())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help(t!("arg_output", locale = locale).to_string())
                        .value_name("OUTPUT")
                        .default_value(DEFAULT_CONFIG_FILE)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("arg_force", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

/// Collects the `run` subcommand arguments.
pub fn run_args(matches: &ArgMatches) -> RunArgs {
    fn many<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Vec<T> {
        matches
            .get_many::<T>(id)
            .map(|values| values.cloned().collect())
            .unwrap_or_default()
    }

    RunArgs {
        config: matches.get_one::<PathBuf>("config").cloned(),
        suite: matches
            .get_one::<PathBuf>("suite")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SUITE_FILE)),
        env_config: matches
            .get_one::<PathBuf>("envconfig")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_CONFIG_FILE)),
        build: many(matches, "build"),
        fs: many(matches, "fs"),
        test_type: many(matches, "test-type"),
        test_sequence: many(matches, "test-sequence"),
        timeout_secs: matches.get_one::<u64>("timeout").copied(),
        log_level: matches.get_one::<u8>("log-level").copied(),
        lang: matches.get_one::<String>("lang").cloned(),
    }
}

/// Parses the command line and runs the selected command.
///
/// # Returns
/// The process exit code: the harness result for `run`, `0` for `init`.
pub async fn run() -> Result<i32> {
    // Pre-parse language and initialize i18n first.
    match pre_parse_language() {
        Some(language) => crate::set_language(&language),
        None => crate::init(),
    }
    let locale = rust_i18n::locale().to_string();

    let matches = build_cli(&locale).get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => commands::run::execute(run_args(run_matches)).await,
        Some(("init", init_matches)) => {
            let output = init_matches
                .get_one::<PathBuf>("output")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            let force = init_matches.get_flag("force");
            commands::init::execute(&output, force)?;
            Ok(0)
        }
        // `subcommand_required` makes clap print help and exit before this.
        _ => Ok(0),
    }
}
