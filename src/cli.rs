use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mediabot")]
#[command(author, version, about = "Telegram bot that downloads YouTube/TikTok media and searches movies", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Print metadata yt-dlp reports for a link
    Info {
        /// Video URL
        url: String,

        /// Print the raw yt-dlp JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Download a link into the download directory
    Download {
        /// Video URL
        url: String,

        /// Quality: 720, 480, 360, best or mp3
        #[arg(short, long, default_value = "best")]
        quality: String,
    },

    /// Search the movie catalog
    Movie {
        /// Title to search for
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
