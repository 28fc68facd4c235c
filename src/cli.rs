// Command and flag definitions plus the commands themselves. Kept in the
// library so the whole flow can be driven from tests with an injected
// environment and output buffer.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::api::{PageQuery, ScrapboxClient};
use crate::config::ClientConfig;
use crate::ui;

#[derive(Parser, Debug)]
#[command(name = "scrapgox", version, about = "scrapbox cli tool")]
pub struct Cli {
    /// Scrapbox host to query
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// User-Agent header to send
    #[arg(long, global = true)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds, 0 disables it
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// list scrapbox pages
    #[command(visible_alias = "l")]
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Set token for request (Cookie: connect.sid)
    #[arg(short, long)]
    pub token: Option<String>,

    /// Also print "<returned> of <total> pages" to stderr
    #[arg(long)]
    pub count: bool,

    /// Project name
    pub project: String,

    /// Search query; lists the most recent pages when omitted
    #[arg(default_value = "")]
    pub query: String,
}

impl Cli {
    /// Resolve the client config: flags win over `lookup` (the environment
    /// in the binary), which wins over the defaults.
    pub fn client_config<F>(&self, lookup: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ClientConfig::from_lookup(&lookup)?;
        if self.base_url.is_some() || self.user_agent.is_some() {
            let base_url = self
                .base_url
                .clone()
                .unwrap_or_else(|| config.base_url.to_string());
            let user_agent = self
                .user_agent
                .clone()
                .unwrap_or_else(|| config.user_agent.clone());
            config = ClientConfig::new(&base_url, config.token.clone(), user_agent)?
                .with_timeout(config.timeout);
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Some(Duration::from_secs(secs)));
        }
        let Command::List(list) = &self.command;
        if list.token.is_some() {
            config = config.with_token(list.token.clone());
        }
        Ok(config)
    }
}

/// Run the parsed command against the real environment and stdout.
pub fn run(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with(&cli, |key| std::env::var(key).ok(), &mut out)
}

pub fn run_with<F, W>(cli: &Cli, lookup: F, out: &mut W) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    W: Write,
{
    let config = cli.client_config(lookup).context("invalid configuration")?;
    let client = ScrapboxClient::new(config)?;
    match &cli.command {
        Command::List(args) => cmd_list(&client, args, out),
    }
}

fn cmd_list<W: Write>(client: &ScrapboxClient, args: &ListArgs, out: &mut W) -> Result<()> {
    let query = PageQuery::new(args.project.as_str(), args.query.as_str());
    let response = client
        .search(&query)
        .with_context(|| format!("failed to list pages of `{}`", args.project))?;
    let summary = args.count.then(|| ui::count_summary(&response));

    ui::print_titles(out, &response.into_pages()).context("failed to write output")?;
    if let Some(summary) = summary {
        eprintln!("{summary}");
    }
    Ok(())
}
