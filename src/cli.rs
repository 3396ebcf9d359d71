use crate::config::{Settings, Strategy};
use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "adoption-history")]
#[command(about = "Backfill the C++ modules adoption series of vcpkg ports from git history")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Path to the tracking repository")]
    pub repo: Option<PathBuf>,

    #[arg(long, global = true, help = "Settings file (default: adoption-history.toml in the repository)")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, action = ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,
}

#[derive(Args, Clone, Default)]
pub struct BackfillArgs {
    #[arg(long, value_enum, help = "How historical files are read")]
    pub strategy: Option<Strategy>,

    #[arg(long, help = "Branch whose history is replayed")]
    pub branch: Option<String>,

    #[arg(long, help = "Series file to write, relative to the repository root")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Series file to resume from, relative to the repository root (default: the output file)")]
    pub prior: Option<PathBuf>,

    #[arg(long, help = "Add overrides that match no baseline port as new ports")]
    pub add_unmatched_overrides: bool,

    #[arg(long, value_name = "CMD", help = "Command producing the progress file (checkout strategy)")]
    pub merge_command: Option<String>,

    #[arg(long, help = "Do not append a point for the local progress file")]
    pub no_live: bool,
}

impl BackfillArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(strategy) = self.strategy {
            settings.strategy = strategy;
        }
        if let Some(branch) = &self.branch {
            settings.branch = branch.clone();
        }
        if let Some(output) = &self.output {
            settings.output = output.clone();
        }
        if let Some(prior) = &self.prior {
            settings.prior = Some(prior.clone());
        }
        if self.add_unmatched_overrides {
            settings.policy.add_unmatched = true;
        }
        if let Some(cmd) = &self.merge_command {
            let parts: Vec<String> = cmd.split_whitespace().map(str::to_string).collect();
            settings.merge_command = if parts.is_empty() { None } else { Some(parts) };
        }
        if self.no_live {
            settings.live_point = false;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extend the series with every commit newer than its latest point
    Backfill(BackfillArgs),
    /// Merge the working-tree port lists into the progress file
    Merge {
        #[arg(long, help = "Where to write the merged file, relative to the repository root (default: the progress file)")]
        output: Option<PathBuf>,
    },
    /// Summarize the series
    Show {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,

        #[arg(long, help = "Series file to read, relative to the repository root (default: the output file)")]
        file: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Backfill(args) => crate::backfill::exec(self.common, args),
            Commands::Merge { output } => crate::merge::exec(self.common, output),
            Commands::Show { json, ndjson, file } => {
                crate::show::exec(self.common, json, ndjson, file)
            }
        }
    }
}
