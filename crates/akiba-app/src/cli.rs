use clap::Parser;

/// Akiba — a retro boot-sequence simulator for your terminal.
#[derive(Parser, Debug)]
#[command(name = "akiba", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// RNG seed for a reproducible boot.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable the memory-test tone.
    #[arg(long)]
    pub no_audio: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
