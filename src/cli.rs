use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "dockyard",
    version,
    about = "An interactive terminal menu for destructive docker housekeeping."
)]
pub struct CliArgs {
    /// Container engine binary to shell out to (overrides the config file)
    #[arg(long)]
    pub docker_bin: Option<String>,

    /// tracing filter (for example: info,debug,trace)
    #[arg(long, default_value = "info")]
    pub log_filter: String,
}
