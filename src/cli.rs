use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::lang::canonicalize_code;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcribe a video and produce translated subtitle tracks
    Process {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Language spoken in the video
        #[arg(short, long, default_value = "ko")]
        source_lang: String,

        /// Target languages for translation (comma-separated)
        #[arg(short, long, default_value = "en")]
        target_langs: String,

        /// Directory to copy finished tracks into
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Translate an existing SRT file into other languages
    TranslateSrt {
        /// Input subtitle file
        #[arg(short, long)]
        input: PathBuf,

        /// Language of the input subtitles
        #[arg(short, long, default_value = "ko")]
        source_lang: String,

        /// Target languages for translation (comma-separated)
        #[arg(short, long, default_value = "en")]
        target_langs: String,

        /// Directory to copy finished tracks into
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Process all video files in a directory
    Batch {
        /// Input directory containing video files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Language spoken in the videos
        #[arg(short, long, default_value = "ko")]
        source_lang: String,

        /// Target languages for translation (comma-separated)
        #[arg(short, long, default_value = "en")]
        target_langs: String,
    },

    /// Look up glossary entries for a piece of text
    Explain {
        /// Text to annotate
        text: String,

        /// Language to display terms and definitions in
        #[arg(short, long, default_value = "ko")]
        display_lang: String,

        /// Language of the text itself (detected when omitted)
        #[arg(short, long)]
        match_lang: Option<String>,
    },

    /// Convert an SRT file to strict WebVTT
    Convert {
        /// Input subtitle file
        #[arg(short, long)]
        input: PathBuf,

        /// Output WebVTT file
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Split a comma-separated language list into canonical, de-duplicated codes.
/// An empty list falls back to English.
pub fn parse_target_langs(raw: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for part in raw.split(',') {
        let code = canonicalize_code(part);
        if part.trim().is_empty() {
            continue;
        }
        if seen.insert(code.clone()) {
            out.push(code);
        }
    }
    if out.is_empty() {
        out.push("en".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_langs_canonicalizes_and_dedups() {
        assert_eq!(parse_target_langs("en, kr, ko"), vec!["en", "ko"]);
        assert_eq!(parse_target_langs("jp"), vec!["ja"]);
    }

    #[test]
    fn test_parse_target_langs_empty_defaults_to_english() {
        assert_eq!(parse_target_langs(""), vec!["en"]);
        assert_eq!(parse_target_langs(" , "), vec!["en"]);
    }
}
