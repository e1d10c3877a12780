use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "graphparse",
    about = "Parse an RDF document and print its statements as N-Quads",
    version
)]
pub struct Cli {
    /// Input file (`-` or omitted reads stdin)
    pub file: Option<PathBuf>,

    /// Content type of the input, e.g. text/turtle (detected from the file extension if omitted)
    #[arg(long, short = 't')]
    pub content_type: Option<String>,

    /// Base IRI for relative references (defaults to the file:// URL of the input)
    #[arg(long, short = 'b')]
    pub base: Option<String>,

    /// Path to a TOML parser config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Do not record the document IRI as the context of parsed statements
    #[arg(long)]
    pub no_provenance: bool,

    /// Print the handled content types and exit
    #[arg(long)]
    pub list_formats: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only report errors
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long)]
    pub no_color: bool,
}
