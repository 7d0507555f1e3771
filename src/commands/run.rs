//! Implementation of the `lockman run` command.

use crate::cli::RunArgs;
use lockman::config::{Config, GrantPolicy};
use lockman::error::{LockError, Result};
use lockman::events::EventLog;
use lockman::manager::LockManager;
use lockman::stream::{StreamSummary, process_stream};
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::Path;

/// Stream commands from the input through a fresh lock manager.
pub fn cmd_run(args: RunArgs, config_path: Option<&Path>) -> Result<()> {
    let config = apply_overrides(Config::load_or_default(config_path)?, &args)?;
    let mut manager = LockManager::from_config(&config);
    let events = config.events_path.as_ref().map(EventLog::new);

    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();

    match &args.input {
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                LockError::Input(format!(
                    "failed to open input file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            process_stream(
                &mut manager,
                BufReader::new(file),
                &mut stdout,
                &mut stderr,
                events.as_ref(),
            )?;
        }
        None => {
            let stdin = io::stdin();
            let interactive = config.interactive_banner && stdin.is_terminal();
            if interactive {
                eprintln!("lockman: reading commands, one per line (Ctrl-D to finish)");
            }
            let summary = process_stream(
                &mut manager,
                stdin.lock(),
                &mut stdout,
                &mut stderr,
                events.as_ref(),
            )?;
            if interactive {
                eprintln!("lockman: {}", summary_line(&summary));
            }
        }
    }

    Ok(())
}

/// One-line tally of a processed stream.
fn summary_line(summary: &StreamSummary) -> String {
    let plural = |n: usize| if n == 1 { "" } else { "s" };
    format!(
        "{} line{} processed, {} rejected",
        summary.lines,
        plural(summary.lines),
        summary.rejected
    )
}

/// Apply command line flags on top of the loaded config.
fn apply_overrides(mut config: Config, args: &RunArgs) -> Result<Config> {
    if let Some(policy) = &args.grant_policy {
        config.grant_policy = GrantPolicy::from_str(policy).ok_or_else(|| {
            LockError::Config(format!(
                "invalid grant policy '{}'. Valid values: batch_shared, single",
                policy
            ))
        })?;
    }

    if let Some(path) = &args.events {
        config.events_path = Some(path.clone());
    }

    if args.no_banner {
        config.interactive_banner = false;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> RunArgs {
        RunArgs {
            input: None,
            grant_policy: None,
            events: None,
            no_banner: false,
        }
    }

    #[test]
    fn overrides_replace_config_values() {
        let args = RunArgs {
            grant_policy: Some("single".to_string()),
            events: Some(PathBuf::from("audit.ndjson")),
            no_banner: true,
            ..args()
        };

        let config = apply_overrides(Config::default(), &args).unwrap();
        assert_eq!(config.grant_policy, GrantPolicy::Single);
        assert_eq!(config.events_path, Some(PathBuf::from("audit.ndjson")));
        assert!(!config.interactive_banner);
    }

    #[test]
    fn no_overrides_keep_config() {
        let config = Config::from_yaml("grant_policy: single").unwrap();
        assert_eq!(apply_overrides(config.clone(), &args()).unwrap(), config);
    }

    #[test]
    fn invalid_grant_policy_is_rejected() {
        let args = RunArgs {
            grant_policy: Some("fair".to_string()),
            ..args()
        };
        let err = apply_overrides(Config::default(), &args).unwrap_err();
        assert!(err.to_string().contains("invalid grant policy 'fair'"));
    }

    #[test]
    fn summary_line_counts_lines_and_rejections() {
        let one = StreamSummary {
            lines: 1,
            rejected: 0,
        };
        assert_eq!(summary_line(&one), "1 line processed, 0 rejected");

        let many = StreamSummary {
            lines: 12,
            rejected: 3,
        };
        assert_eq!(summary_line(&many), "12 lines processed, 3 rejected");
    }

    #[test]
    fn missing_input_file_is_user_error() {
        let args = RunArgs {
            input: Some(PathBuf::from("/nonexistent/lockman/commands.txt")),
            no_banner: true,
            ..args()
        };
        let err = cmd_run(args, None).unwrap_err();
        assert!(matches!(err, LockError::Input(_)));
        assert_eq!(err.exit_code(), lockman::exit_codes::USER_ERROR);
    }
}
