use clap::Parser;
use clap::builder::BoolishValueParser;

/// Environment variable that turns on dry run mode.
pub const DRY_RUN_ENV: &str = "REMEDIATOR_DRY_RUN";

#[derive(Clone, Debug, Default, PartialEq, Eq, Parser)]
#[command(name = "k8s-remediator", about, version)]
pub struct Settings {
    /// Log crash looping pods without deleting them
    #[arg(long, env = DRY_RUN_ENV, value_parser = BoolishValueParser::new())]
    pub dry_run: bool,
}
