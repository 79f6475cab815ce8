//! CLI argument parsing with clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

const DIR_HELP: &str = "Mailbox directory [default: resolved from the environment]";

/// Out-of-process test harness for wire-level server checks.
///
/// An external driver drops command files into a single-slot mailbox
/// directory; wirecheck dispatches each against its test registry and
/// answers with a zero-byte `good` or `bad` sentinel file.
#[derive(Debug, Parser)]
#[command(name = "wirecheck", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the mailbox loop until a quit command arrives
    #[command(after_help = "\
Examples:
  wirecheck run                         # Default mailbox directory
  wirecheck run --dir ./mailbox         # Explicit mailbox directory
  wirecheck run --journal wire.jsonl    # Record wire traffic for debugging")]
    Run(RunArgs),

    /// Reset the mailbox directory: create it, clear stale protocol files
    Clean(CleanArgs),

    /// Probe a loopback port and print `open` or `closed`
    Probe(ProbeArgs),

    /// Show an end-to-end driver walkthrough
    Examples,
}

#[derive(Debug, clap::Args)]
pub struct RunArgs {
    #[arg(short, long, value_name = "DIR", help = DIR_HELP)]
    pub dir: Option<PathBuf>,

    /// Append wire-level events to this JSON-lines journal file
    #[arg(long, value_name = "FILE")]
    pub journal: Option<PathBuf>,

    /// Wait between empty mailbox scans, in milliseconds
    #[arg(long, default_value_t = 20, value_name = "MS")]
    pub idle_wait: u64,
}

#[derive(Debug, clap::Args)]
pub struct CleanArgs {
    #[arg(short, long, value_name = "DIR", help = DIR_HELP)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct ProbeArgs {
    /// Loopback port to probe with a real TCP connect
    pub port: u16,
}

/// End-to-end walkthrough text for the `examples` command.
pub const EXAMPLES_TEXT: &str = r#"End-to-end example: drive wirecheck from a shell

The harness scans a mailbox directory for one command file at a time and
answers each with a zero-byte `good` or `bad` sentinel. Consume the
sentinel before writing the next command; two pending commands at once
abort the run.

# 1. Start the harness against a scratch mailbox
wirecheck run --dir ./mailbox &

# 2. Self-check the dispatch machinery
touch ./mailbox/probe_true.comm
# ...wait until ./mailbox/good appears, then consume it
rm ./mailbox/good

# 3. Connect to the server under test on port 9000
touch ./mailbox/connect@9000.comm
rm ./mailbox/good

# 4. Send one packet: the filename routes it, the body is the payload
printf 'hello' > ./mailbox/send@user1.comm
rm ./mailbox/good

# 5. Expect one packet back with the same id and payload
printf 'hello' > ./mailbox/read@user1.comm
rm ./mailbox/good

# 6. Shut the harness down
touch ./mailbox/quit.comm
"#;

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_run_parses_flags() {
        let cli = Cli::parse_from([
            "wirecheck",
            "run",
            "--dir",
            "./mailbox",
            "--journal",
            "wire.jsonl",
            "--idle-wait",
            "50",
        ]);

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.dir.as_deref(), Some(std::path::Path::new("./mailbox")));
                assert_eq!(
                    args.journal.as_deref(),
                    Some(std::path::Path::new("wire.jsonl"))
                );
                assert_eq!(args.idle_wait, 50);
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_probe_parses_port() {
        let cli = Cli::parse_from(["wirecheck", "probe", "9000"]);
        match cli.command {
            Commands::Probe(args) => assert_eq!(args.port, 9000),
            _ => panic!("Expected probe command"),
        }
    }
}
