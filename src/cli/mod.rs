pub mod args;
pub mod commands;

pub use args::{ParseArgs, ServeArgs, ViewMode};
use clap::{Parser, Subcommand};

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
SOURCE COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "scsource")]
#[command(version = crate::VERSION)]
#[command(about = "Read Shortcuts workflows from iCloud links, property lists, or JSON")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: parse a shared link or a pasted document, inspect the steps, then export it as JSON or XML."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "Classify and normalize one input",
        long_about = "Parse detects whether the input is an iCloud shortcut link, an XML property list, or JSON, resolves links through the configured relay endpoints, and prints the normalized result. Failures are reported as diagnostics without a failing exit status.",
        after_help = "Examples:\n    scsource parse https://www.icloud.com/shortcuts/abc123 --view details\n    scsource parse --file Morning.plist --format json --output ./exports"
    )]
    Parse(ParseArgs),
    #[command(
        about = "Run the HTTP extraction service",
        long_about = "Serve answers GET /?shortcuturl=<link>&fmt=json|xml with the exported document as an attachment, and GET /health for liveness checks.",
        after_help = "Example:\n    scsource serve --bind 127.0.0.1:3333"
    )]
    Serve(ServeArgs),
}

pub async fn run(args: Args) -> crate::Result<()> {
    match args.command {
        Command::Parse(parse_args) => commands::parse(parse_args).await,
        Command::Serve(serve_args) => commands::serve(serve_args).await,
    }
}
