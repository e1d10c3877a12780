mod cli;
mod config;
mod detect;
mod error;
mod input;

use clap::Parser as _;
use cli::Cli;
use error::{exit_with_error, CliError, CliResult};
use graphparse::{ParseError, Parser};
use graphparse_ir::Graph;
use tracing::debug;

fn init_tracing(cli: &Cli) {
    // --quiet keeps errors only. Otherwise RUST_LOG wins, falling back to
    // debug with --verbose and to warnings (skipped statements) by default.
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("error")
    } else {
        let fallback = if cli.verbose { "debug" } else { "warn" };
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into())
    };

    let ansi = !(cli.no_color || std::env::var_os("NO_COLOR").is_some());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Errors go to stderr, so a piped stdout keeps colored errors.
    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    init_tracing(&cli);

    if let Err(e) = run(cli).await {
        exit_with_error(e);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    if cli.list_formats {
        for content_type in graphparse::handled_content_types() {
            println!("{content_type}");
        }
        return Ok(());
    }

    let config = config::resolve(&cli)?;
    let source = input::resolve_input(cli.file.as_deref())?;
    let content = input::read_input(&source)?;

    let content_type = cli
        .content_type
        .clone()
        .or_else(|| detect::detect_content_type(source.path(), &content).map(String::from));
    let base = match cli.base.clone() {
        Some(base) => base,
        None => input::default_base(&source)?,
    };
    let name = source.describe();
    debug!(input = %name, ?content_type, base = %base, "read input");

    let parser = Parser::new(config);
    let mut graph = Graph::new();
    let mut failure: Option<CliError> = None;
    parser
        .parse(
            &content,
            &mut graph,
            &base,
            content_type.as_deref(),
            Some(Box::new(|fault: Option<&ParseError>, _: &mut Graph| {
                failure = fault.map(|f| CliError::from_fault(f, &name));
            })),
        )
        .await?;

    if let Some(err) = failure {
        return Err(err);
    }

    print!("{}", graph.to_nquads());
    Ok(())
}
