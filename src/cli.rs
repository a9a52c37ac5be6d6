use clap::{ArgAction, Parser, Subcommand};
use shelfscan_export::ExportFormat;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "shelfscan", version, about = "Scan ISBN barcodes into a personal book library")]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(long, short, global = true, env = "SHELFSCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// More logging; repeat for more detail. `RUST_LOG` takes precedence.
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open a scan session reading identifiers from stdin, one per line.
    ///
    /// `:status` prints the session status, `:close` discards everything
    /// staged, and `:commit` (or end of input) adds the staged books to the
    /// library.
    Scan {
        /// Look books up but don't write anything to the library.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print every book in the library.
    List,
    /// Export the library.
    Export {
        #[arg(long, short, default_value = "text", value_parser = parse_format)]
        format: ExportFormat,
        /// Defaults to stdout for text, `my-library.pdf` for PDF. Not used by
        /// the clipboard.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    s.parse::<ExportFormat>().map_err(|e| (*e).to_string())
}

impl Cli {
    /// Default log filter for the `-v` count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["shelfscan", "export"], ExportFormat::Text, None)]
    #[case(&["shelfscan", "export", "--format", "pdf"], ExportFormat::Pdf, None)]
    #[case(&["shelfscan", "export", "-f", "text", "-o", "books.txt"], ExportFormat::Text, Some("books.txt"))]
    #[case(&["shelfscan", "export", "--format", "clipboard"], ExportFormat::Clipboard, None)]
    fn test_export_args(#[case] args: &[&str], #[case] format: ExportFormat, #[case] output: Option<&str>) {
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Export { format: parsed, output: path } = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(parsed, format);
        assert_eq!(path, output.map(PathBuf::from));
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["shelfscan", "export", "--format", "docx"]).is_err());
    }

    #[rstest]
    #[case(&["shelfscan", "list"], "warn")]
    #[case(&["shelfscan", "-v", "list"], "info")]
    #[case(&["shelfscan", "scan", "-vv", "--dry-run"], "debug")]
    #[case(&["shelfscan", "-vvvv", "list"], "trace")]
    fn test_log_level(#[case] args: &[&str], #[case] level: &str) {
        assert_eq!(Cli::try_parse_from(args).unwrap().log_level(), level);
    }
}
