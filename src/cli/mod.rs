//! CLI argument parsing for agentform.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Agentform: declarative multi-agent LLM pipelines.
///
/// Resources (providers, models, memories, tools, agents, tasks and
/// deployments) are declared in one TOML document:
/// - `verify` checks every cross-reference
/// - `plan` / `apply` reconcile the document against the applied state
/// - `run` and `serve` execute the declared task pipelines
#[derive(Parser, Debug)]
#[command(name = "agentform")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Project directory (default: current directory).
    #[arg(long, global = true, env = "AGENTFORM_DIR")]
    pub dir: Option<PathBuf>,

    /// Configuration document, relative to the project directory.
    #[arg(long, global = true, env = "AGENTFORM_CONFIG")]
    pub config: Option<PathBuf>,

    /// State file, relative to the project directory.
    #[arg(long, global = true, env = "AGENTFORM_STATE")]
    pub state: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error, off.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format: text or json.
    #[arg(long, global = true, env = "AGENTFORM_LOG_FORMAT")]
    pub log_format: Option<String>,
}

/// Available commands for agentform.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scaffold a new project.
    ///
    /// Writes an example configuration document and prompt file.
    /// Existing files are left untouched.
    Init(InitArgs),

    /// Check the configuration document.
    ///
    /// Reports every dangling reference and unsupported value.
    Verify,

    /// Show what `apply` would change.
    Plan,

    /// Verify, instantiate and record the configuration as applied state.
    Apply,

    /// Print the declared resources as a tree.
    Show,

    /// Run a task once and print its output.
    Run(RunArgs),

    /// Start a deployment and serve its tasks until interrupted.
    Serve(ServeArgs),

    /// Forget all applied state.
    Destroy,
}

/// Arguments for the `init` command.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: the project directory).
    pub directory: Option<PathBuf>,
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Task name.
    pub task: String,

    /// Input text for the task.
    #[arg(short, long, conflicts_with = "input_file")]
    pub input: Option<String>,

    /// Read the task input from a file.
    #[arg(long)]
    pub input_file: Option<PathBuf>,
}

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Deployment name (default: the only deployment, or `default`).
    pub deployment: Option<String>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_simple_commands() {
        let parse = |name: &str| Cli::try_parse_from(["agentform", name]).unwrap().command;
        assert!(matches!(parse("verify"), Command::Verify));
        assert!(matches!(parse("plan"), Command::Plan));
        assert!(matches!(parse("apply"), Command::Apply));
        assert!(matches!(parse("show"), Command::Show));
        assert!(matches!(parse("destroy"), Command::Destroy));
        assert!(matches!(parse("init"), Command::Init(InitArgs { directory: None })));
    }

    #[test]
    fn parse_init_directory() {
        let cli = Cli::try_parse_from(["agentform", "init", "demo"]).unwrap();
        if let Command::Init(args) = cli.command {
            assert_eq!(args.directory, Some(PathBuf::from("demo")));
        } else {
            panic!("Expected Init command");
        }
    }

    #[test]
    fn parse_run_with_input() {
        let cli = Cli::try_parse_from(["agentform", "run", "qa", "--input", "Why?"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.task, "qa");
            assert_eq!(args.input.as_deref(), Some("Why?"));
            assert_eq!(args.input_file, None);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_input_sources_conflict() {
        let result = Cli::try_parse_from([
            "agentform",
            "run",
            "qa",
            "--input",
            "x",
            "--input-file",
            "q.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_serve_optional_deployment() {
        let cli = Cli::try_parse_from(["agentform", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve(ServeArgs { deployment: None })));

        let cli = Cli::try_parse_from(["agentform", "serve", "public"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.deployment.as_deref(), Some("public"));
        } else {
            panic!("Expected Serve command");
        }
    }

    #[test]
    fn parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "agentform",
            "plan",
            "--dir",
            "proj",
            "--state",
            "s.toml",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.global.dir, Some(PathBuf::from("proj")));
        assert_eq!(cli.global.state, Some(PathBuf::from("s.toml")));
        assert_eq!(cli.global.log_level.as_deref(), Some("debug"));
    }
}
