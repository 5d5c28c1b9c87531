//! CLI definitions for vesper.

use clap::Parser;

/// vesper CLI.
#[derive(Parser, Debug)]
#[command(name = "vesper")]
#[command(about = "Minimal keyboard-driven web browser")]
#[command(version)]
pub(crate) struct Cli {
    /// Neither join nor host a shared browser process
    #[arg(short = 'C', long)]
    pub no_cooperation: bool,

    /// Print the window state as JSON on exit
    #[arg(long)]
    pub dump_chrome: bool,

    /// URIs or local paths, one tab each
    #[arg(value_name = "URI")]
    pub uris: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uris_and_flags() {
        let cli = Cli::try_parse_from(["vesper", "-C", "example.com", "./notes.html"]).unwrap();
        assert!(cli.no_cooperation);
        assert!(!cli.dump_chrome);
        assert_eq!(cli.uris, vec!["example.com", "./notes.html"]);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["vesper"]).unwrap();
        assert!(!cli.no_cooperation);
        assert!(cli.uris.is_empty());

        let cli = Cli::try_parse_from(["vesper", "--no-cooperation", "--dump-chrome"]).unwrap();
        assert!(cli.no_cooperation);
        assert!(cli.dump_chrome);
    }
}
