use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "story-pages")]
#[command(about = "Fetch a story part and print it as styled content blocks")]
#[command(version)]
pub struct Args {
    /// Text location of the part (absolute, or relative to the base URL)
    #[arg(required_unless_present = "clear_cache")]
    pub text_url: Option<String>,

    /// Title to give the rendered page
    #[arg(short, long, default_value = "Untitled")]
    pub title: String,

    /// Path to a JSON client configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Cache directory (overrides the configuration)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Bypass the response cache entirely
    #[arg(long)]
    pub no_cache: bool,

    /// Remove all cached responses before doing anything else
    #[arg(long)]
    pub clear_cache: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text, one block per paragraph
    Text,
    /// The rendered page as JSON
    Json,
}
