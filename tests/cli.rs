use clap::Parser;

use cmdcapture::cli::{CliArgs, CliCommand, LogLevel};
use cmdcapture::exit_status_for;

#[test]
fn run_subcommand_parses_all_flags() {
    let args = CliArgs::try_parse_from([
        "cmdcapture",
        "--log-level",
        "debug",
        "run",
        "--timeout",
        "1.5",
        "--cwd",
        "/tmp",
        "--env",
        "A=1",
        "--env",
        "B=x=y",
        "--input",
        "hello",
        "--check",
        "--stream",
        "echo $A",
    ])
    .expect("valid arguments");

    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    match args.command {
        CliCommand::Run(run) => {
            assert_eq!(run.command, "echo $A");
            assert_eq!(run.timeout, Some(1.5));
            assert_eq!(run.cwd.as_deref(), Some(std::path::Path::new("/tmp")));
            assert_eq!(
                run.env,
                vec![("A".to_string(), "1".to_string()), ("B".to_string(), "x=y".to_string())]
            );
            assert_eq!(run.input.as_deref(), Some("hello"));
            assert!(run.check);
            assert!(run.stream);
        }
        other => panic!("Expected run subcommand, got {other:?}"),
    }
}

#[test]
fn malformed_env_pair_is_rejected() {
    let res = CliArgs::try_parse_from(["cmdcapture", "run", "--env", "NOEQUALS", "true"]);
    assert!(res.is_err());
}

#[test]
fn batch_subcommand_accepts_commands_and_flags() {
    let args = CliArgs::try_parse_from([
        "cmdcapture",
        "batch",
        "--parallel",
        "echo a",
        "echo b",
        "--config",
        "cmdcapture.toml",
    ])
    .expect("valid arguments");

    assert_eq!(args.config.as_deref(), Some(std::path::Path::new("cmdcapture.toml")));
    match args.command {
        CliCommand::Batch(batch) => {
            assert!(batch.parallel);
            assert!(!batch.fail_fast);
            assert_eq!(batch.commands, vec!["echo a", "echo b"]);
        }
        other => panic!("Expected batch subcommand, got {other:?}"),
    }
}

#[test]
fn which_requires_a_name() {
    assert!(CliArgs::try_parse_from(["cmdcapture", "which"]).is_err());
}

#[test]
fn exit_status_mapping() {
    assert_eq!(exit_status_for(0), 0);
    assert_eq!(exit_status_for(2), 2);
    assert_eq!(exit_status_for(-9), 137);
    assert_eq!(exit_status_for(-15), 143);
    assert_eq!(exit_status_for(1000), 1);
}

#[test]
fn log_level_flag_maps_onto_level_filter() {
    use tracing::level_filters::LevelFilter;

    assert_eq!(LevelFilter::from(LogLevel::Error), LevelFilter::ERROR);
    assert_eq!(LevelFilter::from(LogLevel::Debug), LevelFilter::DEBUG);
    assert_eq!(LevelFilter::from(LogLevel::Trace), LevelFilter::TRACE);
}
