use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "signalserve")]
#[command(version, about = "Serve a trained classification model over HTTP", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "signalserve.yaml")]
    pub config: String,

    /// Model descriptor file (features, classes, class colors)
    #[arg(short, long)]
    pub descriptor: Option<PathBuf>,

    /// Model artifact file
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Listen address
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "PORT")]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
