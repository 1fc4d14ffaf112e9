//! reqtail - Entry Point

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// TUI viewer for request-correlated JSON-lines application logs
#[derive(Parser, Debug)]
#[command(name = "reqtail")]
#[command(version)]
#[command(about = "Tail a JSON-lines application log and browse requests with their queries")]
pub struct Args {
    /// Path to the JSON-lines log file
    #[arg(default_value = "log/development.log")]
    pub file: PathBuf,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Full precedence chain: defaults -> config file -> env vars -> CLI args
    let config = {
        let config_file = reqtail::config::load_config_file(args.config.clone())?;
        let merged = reqtail::config::merge_config(config_file);
        let with_env = reqtail::config::apply_env_overrides(merged);
        let no_color_override = if args.no_color { Some(true) } else { None };
        reqtail::config::apply_cli_overrides(with_env, no_color_override)
    };

    reqtail::logging::init(&config.log_file_path)?;

    info!(config = ?config, file = ?args.file, "configuration loaded and resolved");

    // Opening the tailer validates the file exists; the error reaches the
    // operator before the terminal enters the alternate screen.
    let tailer = reqtail::source::LogTailer::open(&args.file)?;

    reqtail::view::run(tailer, &config)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn help_does_not_error() {
        let result = Args::try_parse_from(["reqtail", "--help"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn version_does_not_error() {
        let result = Args::try_parse_from(["reqtail", "--version"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn no_args_uses_default_log_path() {
        let args = Args::parse_from(["reqtail"]);
        assert_eq!(args.file, PathBuf::from("log/development.log"));
        assert!(!args.no_color);
        assert_eq!(args.config, None);
    }

    #[test]
    fn positional_file_path_is_accepted() {
        let args = Args::parse_from(["reqtail", "/var/log/app.log"]);
        assert_eq!(args.file, PathBuf::from("/var/log/app.log"));
    }

    #[test]
    fn no_color_flag() {
        let args = Args::parse_from(["reqtail", "--no-color"]);
        assert!(args.no_color);
    }

    #[test]
    fn config_path_flag() {
        let args = Args::parse_from(["reqtail", "--config", "/custom/config.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn no_color_flag_flows_through_precedence_chain() {
        use reqtail::config::{apply_cli_overrides, merge_config};

        let resolved = merge_config(None);
        assert!(!resolved.no_color);

        let with_cli = apply_cli_overrides(resolved, Some(true));
        assert!(with_cli.no_color, "CLI flag should override the default");
    }
}
