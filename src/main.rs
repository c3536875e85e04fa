//! octomcp CLI: run the tool server, or drive it as a client

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::info;
use octomcp::{
    agent::{Agent, AgentConfig, AgentData, AgentResponse},
    command::COMMAND_HELP,
    github::GitHubTools,
    server::{Server, ServerConfig},
    transport::stdio::StdioTransport,
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// GitHub tools over MCP-style JSON-RPC
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the GitHub tool server on stdio
    Serve,

    /// Run one command through a fresh server session
    Run {
        /// The command line, e.g. `list_repositories octocat`
        #[arg(required = true, num_args = 1.., value_name = "COMMAND")]
        command: Vec<String>,

        /// Timeout in seconds for operations
        #[arg(short = 'T', long, default_value_t = 30)]
        timeout: u64,
    },

    /// List the tools the server advertises
    Tools {
        /// Timeout in seconds for operations
        #[arg(short = 'T', long, default_value_t = 30)]
        timeout: u64,
    },

    /// Interactive command loop against one long-lived server
    Repl {
        /// Timeout in seconds for operations
        #[arg(short = 'T', long, default_value_t = 30)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(default_filter));

    match cli.command {
        Commands::Serve => serve().await,
        Commands::Run { command, timeout } => run_command(command, timeout).await,
        Commands::Tools { timeout } => list_tools(timeout).await,
        Commands::Repl { timeout } => repl(timeout).await,
    }
}

/// Spawn ourselves with `serve` as the server process
fn agent_config(timeout: u64) -> Result<AgentConfig> {
    let exe = std::env::current_exe().context("Failed to locate the octomcp binary")?;
    Ok(AgentConfig::new(exe.display().to_string()).with_timeout(Duration::from_secs(timeout)))
}

async fn serve() -> Result<()> {
    let tools = GitHubTools::from_env();
    if tools.api().has_token() {
        info!("GitHub token configured; mutating tools enabled");
    } else {
        info!("No GITHUB_TOKEN set; running read-only");
    }

    let mut server = Server::new(ServerConfig::new(), tools);
    server.serve(StdioTransport::new()).await?;
    Ok(())
}

async fn run_command(command: Vec<String>, timeout: u64) -> Result<()> {
    // Re-quote tokens so arguments with spaces survive the round trip
    // through the command parser.
    let query = shell_words::join(&command);

    let config = agent_config(timeout)?;
    let response = Agent::run_once(&config, &query).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn list_tools(timeout: u64) -> Result<()> {
    let config = agent_config(timeout)?;
    let agent = Agent::connect(&config).await?;
    let tools = agent.list_tools().await?;
    agent.shutdown().await?;

    println!("Available tools ({}):", tools.len());
    for tool in tools {
        println!("  - {}", tool);
    }
    Ok(())
}

fn print_help() {
    println!("{}", "Available commands:".yellow().bold());
    for line in COMMAND_HELP {
        println!("  {}", line);
    }
    println!("  {}", "tools | help | exit".dimmed());
}

fn print_response(response: &AgentResponse) {
    match response {
        AgentResponse::Error { error } => {
            println!("{} {}", "Error:".red().bold(), error);
        }
        AgentResponse::Success { data, count, .. } => {
            match data {
                AgentData::Single(text) => println!("{}", text),
                AgentData::Many(blocks) => println!("{}", blocks.join("\n\n")),
            }
            if let Some(count) = count {
                println!("\n{}", format!("{} results", count).dimmed());
            }
        }
    }
}

async fn repl(timeout: u64) -> Result<()> {
    let config = agent_config(timeout)?;
    let agent = Agent::connect(&config).await?;

    println!("{}", "octomcp interactive client".cyan().bold());
    println!("{}", "Type 'help' for commands, 'exit' to quit.".dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all("octomcp> ".cyan().to_string().as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => continue,
            "exit" | "quit" => break,
            "help" => print_help(),
            "tools" => {
                let tools = agent.list_tools().await?;
                println!("Available tools ({}):", tools.len());
                for tool in tools {
                    println!("  - {}", tool);
                }
            }
            query => {
                let response = agent.run(query).await;
                print_response(&response);
            }
        }
    }

    println!("{}", "Closing session...".dimmed());
    agent.shutdown().await?;
    Ok(())
}
