//! tokenlens CLI - show how likely each generated token was
//!
//! Usage:
//!   tokenlens <PROMPT> [--url <URL>] [--hover <INDEX>[,<INDEX>...]] [--html <FILE>]
//!
//! Example:
//!   tokenlens "The sky is" --hover 0,1
//!   tokenlens "Write a haiku" --hover-all --html haiku.html -v

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::str::FromStr;
use tokenlens::controller::ControllerState;
use tokenlens::html::render_page;
use tokenlens::term::{visible_token, TerminalSurface, TerminalTooltip};
use tokenlens::{HttpGenerationClient, ResponseController, TokenLensConfig};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "tokenlens", version)]
#[command(about = "Generate text and inspect the probability of every token")]
struct Args {
    /// Prompt to send to the generation server
    prompt: String,

    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Generation server base URL (overrides the config file)
    #[arg(short, long)]
    url: Option<String>,

    /// Hover the tokens at these positions and print their tooltips
    /// (comma separated, or repeat the flag)
    #[arg(long, value_name = "INDEX", value_delimiter = ',')]
    hover: Vec<usize>,

    /// Hover every token
    #[arg(long, conflicts_with = "hover")]
    hover_all: bool,

    /// Also write the response as an interactive HTML page
    #[arg(long, value_name = "FILE")]
    html: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn log_level(config: &TokenLensConfig, verbose: u8) -> Level {
    match verbose {
        0 => Level::from_str(&config.log_level).unwrap_or(Level::INFO),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn print_header(prompt: &str, url: &str) {
    eprintln!();
    eprintln!("{}  {}", "Server:".dimmed(), url);
    eprintln!("{}  {}", "Prompt:".dimmed(), prompt.bold());
    eprintln!();
}

fn print_legend() {
    eprintln!(
        "{}  {} {} {} {}",
        "Legend:".dimmed(),
        "p > 0.5".green(),
        "p > 0.2".cyan(),
        "p > 0.05".yellow(),
        "lower".red().bold()
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TokenLensConfig::load(path)?,
        None => TokenLensConfig::default(),
    };
    if let Some(url) = &args.url {
        config.client.base_url = url.clone();
    }

    // Logs go to stderr so stdout holds only the response
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(&config, args.verbose))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if args.no_color {
        colored::control::set_override(false);
    }

    let client = HttpGenerationClient::from_config(&config.client)
        .context("Failed to create HTTP client")?;
    info!(url = client.url(), "Using generation server");

    print_header(&args.prompt, client.url());

    let surface = TerminalSurface::new(args.prompt.clone())
        .styled(!args.no_color)
        .with_progress(true);
    let tooltip = TerminalTooltip::new(std::io::stdout());
    let mut controller = ResponseController::new(surface, tooltip);

    if let Err(err) = controller.submit(&client).await {
        eprintln!("{} {}", "Error:".red().bold(), err);
        std::process::exit(2);
    }

    print!("{}", controller.surface().render());

    let hover: Vec<usize> = if args.hover_all {
        (0..controller.elements().len()).collect()
    } else {
        args.hover.clone()
    };

    if !hover.is_empty() && !controller.elements().is_empty() {
        println!();
        if !args.no_color {
            print_legend();
        }
    }

    for index in hover {
        let Some(text) = controller
            .elements()
            .get(index)
            .map(|e| e.text().to_string())
        else {
            warn!(
                index,
                tokens = controller.elements().len(),
                "No token at this position"
            );
            continue;
        };
        let quoted = format!("\"{}\"", visible_token(&text));
        println!("{} {} {}", "Token".bold(), index, quoted.as_str().cyan());
        controller.pointer_move(index, 0.0, 0.0);
        controller.pointer_out(index);
    }

    if let Some(path) = &args.html {
        let page = render_page(&args.prompt, controller.surface().nodes());
        std::fs::write(path, page)
            .with_context(|| format!("Failed to write HTML page: {}", path.display()))?;
        eprintln!("{} {}", "Wrote".dimmed(), path.display());
    }

    debug!(state = ?controller.state(), "Done");
    if controller.state() == ControllerState::Failed {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hover_does_not_swallow_prompt() {
        let args = Args::try_parse_from(["tokenlens", "--hover", "0", "The sky is"]).unwrap();
        assert_eq!(args.hover, vec![0]);
        assert_eq!(args.prompt, "The sky is");

        let args =
            Args::try_parse_from(["tokenlens", "p", "--hover", "0,2", "--hover", "5"]).unwrap();
        assert_eq!(args.hover, vec![0, 2, 5]);
    }

    #[test]
    fn test_hover_all_conflicts_with_hover() {
        let args = Args::try_parse_from(["tokenlens", "p", "--hover", "1", "--hover-all"]);
        assert!(args.is_err());
    }
}
