use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about)]
pub struct Arguments {
    #[arg(short = 'v', long = None, env = "PROTIMER_VERBOSITY", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Where the settings blob lives.
    #[arg(
        short,
        long,
        env = "PROTIMER_SETTINGS",
        default_value = "protimer-settings.json"
    )]
    pub settings: PathBuf,

    /// Directory session exports are written into.
    #[arg(short, long, env = "PROTIMER_EXPORT_DIR", default_value = ".")]
    pub export_dir: PathBuf,
}
