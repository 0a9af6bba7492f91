use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{self, EnvFilter};

use hubcap::github::config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use hubcap::github::{ClientConfig, GithubClient, RepoSpec, resolve_token};
use hubcap::router::{PathRouter, Resolved};
use hubcap::views::{
    DEFAULT_SUMMARY_FIELDS, DiscussionCollectionView, LazyKeyedView, RepositoryHandle,
    text_contents,
};

#[derive(Parser)]
#[command(author, version, about = "Browse GitHub accounts, repositories, issues and discussions as nested keys", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// GitHub API token (overrides HUBCAP_GITHUB_TOKEN and GITHUB_TOKEN)
    #[arg(short = 't', long, global = true)]
    github_token: Option<String>,

    /// REST API base URL
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// GraphQL endpoint, defaults to `<api-url>/graphql`
    #[arg(long, global = true)]
    graphql_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the keys under a path
    Ls {
        #[arg(
            help = "Path or GitHub URL - 'owner', 'owner/repo', 'owner/repo/tree/main/src', 'owner/repo/issues/12', or 'https://github.com/owner/repo/blob/main/README.md'"
        )]
        path: String,
    },
    /// Print the value at a path
    Get {
        #[arg(help = "Path or GitHub URL, as for 'ls'")]
        path: String,

        /// Decode file contents as UTF-8 text
        #[arg(long)]
        text: bool,
    },
    /// Dump one discussion, with every comment and reply, as JSON
    Discussion {
        #[arg(help = "Repository - 'owner/repo' or a GitHub repository URL")]
        repository: String,

        /// Discussion number
        number: u64,
    },
    /// Print selected repository fields as JSON
    Info {
        #[arg(help = "Repository - 'owner/repo' or a GitHub repository URL")]
        repository: String,

        /// Space separated field names, e.g. "name html_url"
        #[arg(short, long)]
        fields: Option<String>,
    },
}

/// Prints a resolved value: file contents through `write_file`, text and JSON
/// as-is, anything navigable as its key list
fn print_resolved<V: 'static>(
    resolved: Resolved<V>,
    write_file: impl FnOnce(V) -> std::io::Result<()>,
) -> Result<()> {
    match resolved {
        Resolved::File(contents) => write_file(contents)?,
        Resolved::Text(text) => println!("{}", text),
        Resolved::Json(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Resolved::Discussion(discussion) => {
            println!("{}", serde_json::to_string_pretty(&discussion)?)
        }
        other => {
            for key in other.keys()? {
                println!("{}", key);
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    let mut config = ClientConfig::default()
        .with_base_url(cli.api_url.clone())
        .with_timeout(Duration::from_secs(cli.timeout));
    if let Some(graphql_url) = &cli.graphql_url {
        config = config.with_graphql_url(graphql_url.clone());
    }
    if cli.github_token.is_some() {
        tracing::info!("Using GitHub token from command line arguments");
    }
    if let Some(token) = resolve_token(cli.github_token.clone()) {
        config = config.with_token(token);
    }
    let client = GithubClient::new(config)?;

    match cli.command {
        Commands::Ls { path } => {
            for key in PathRouter::new(client).route(&path)?.keys()? {
                println!("{}", key);
            }
        }
        Commands::Get { path, text: false } => {
            let resolved = PathRouter::new(client).route(&path)?;
            print_resolved(resolved, |bytes| {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&bytes)?;
                stdout.flush()
            })?;
        }
        Commands::Get { path, text: true } => {
            let router = PathRouter::with_extractor(client, Rc::new(text_contents));
            print_resolved(router.route(&path)?, |text| {
                println!("{}", text);
                Ok(())
            })?;
        }
        Commands::Discussion { repository, number } => {
            let spec = RepoSpec::parse(&repository)?;
            let discussions =
                DiscussionCollectionView::new(RepositoryHandle::resolve(&client, &spec)?)?;
            let discussion = discussions.get(&number)?;
            println!("{}", serde_json::to_string_pretty(&discussion)?);
        }
        Commands::Info { repository, fields } => {
            let repo = RepositoryHandle::resolve(&client, &RepoSpec::parse(&repository)?)?;
            let summary = match &fields {
                Some(fields) => repo.summary(&fields.split_whitespace().collect::<Vec<_>>())?,
                None => repo.summary(&DEFAULT_SUMMARY_FIELDS)?,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
