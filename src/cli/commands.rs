use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// `geminizer` - prompt authoring and image generation client.
#[derive(Parser, Debug)]
#[command(name = "geminizer")]
#[command(version)]
#[command(about = "Author, screen and generate professional image prompts.", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate an image from a prompt
    Generate {
        /// Prompt text
        prompt: String,

        /// Option override as category=value (repeatable), e.g. -o lighting="golden hour"
        #[arg(short = 'o', long = "option", value_parser = parse_option)]
        options: Vec<(String, String)>,

        /// Skip the safety screening before generation
        #[arg(long)]
        no_safety: bool,

        /// Hide the staged agent activity log
        #[arg(long)]
        quiet: bool,

        /// Write the image to disk after generation
        #[arg(long)]
        export: bool,

        /// Directory for exported images (default: generation.export_dir or .)
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },

    /// Screen a prompt with the safety check
    Safety {
        /// Prompt text
        prompt: String,
    },

    /// Browse or delete past generations
    History {
        #[command(subcommand)]
        history_command: HistoryCommands,
    },

    /// Run the live multi-agent demonstration
    Demo,

    /// Analyze a professional pose sample or a custom prompt
    Analyze {
        /// Pose key (see `geminizer poses`)
        pose: Option<String>,

        /// Analyze this prompt instead of a pose sample
        #[arg(long, conflicts_with = "pose")]
        prompt: Option<String>,
    },

    /// List the built-in professional poses
    Poses,

    /// Send a command to the expert interface
    Expert {
        /// Command text
        command: Option<String>,

        /// Quick physics preset: "wetness <level>", "underwater", "flowing", "material <name>"
        #[arg(long, conflicts_with = "command")]
        preset: Option<String>,

        /// Send the command without the EXPERT prefix
        #[arg(long)]
        raw: bool,

        /// Print the command library and exit
        #[arg(long)]
        library: bool,
    },

    /// Show AI system status
    Status {
        /// Keep polling until interrupted
        #[arg(long)]
        watch: bool,
    },

    /// Show details of one AI agent
    Agent {
        /// Agent id, e.g. nlu
        id: String,
    },

    /// Store credentials for the service
    Login {
        /// Username
        username: String,

        /// Credential token
        #[arg(long)]
        token: String,

        /// Display name
        #[arg(long)]
        display_name: Option<String>,
    },

    /// Forget stored credentials
    Logout,

    /// Show the signed-in identity
    Whoami,

    /// Show the effective configuration
    Config,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List past generations, newest first
    List,

    /// Delete one generation
    Delete {
        /// Generation id
        id: String,
    },
}

fn parse_option(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected category=value, got '{raw}'"))?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() || value.is_empty() {
        return Err(format!("expected category=value, got '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
