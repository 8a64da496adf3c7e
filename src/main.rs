use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use tidings::config::Config;
use tidings::feed::{fetch_and_parse, FeedItem, FetchOptions};
use tidings::util::strip_control_chars;

/// Get the config directory path (~/.config/tidings/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("tidings"))
}

#[derive(Parser, Debug)]
#[command(name = "tidings", version, about = "Fetch an RSS feed and list its items")]
struct Args {
    /// Feed URL (defaults to `feed_url` in the config file)
    url: Option<String>,

    /// Config file to use instead of ~/.config/tidings/config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print items as a JSON array
    #[arg(long)]
    json: bool,
}

fn load_config(explicit: Option<PathBuf>) -> Result<Config> {
    let path = match explicit {
        Some(path) => path,
        None => match get_config_dir() {
            Ok(dir) => dir.join("config.toml"),
            Err(e) => {
                tracing::debug!(error = %e, "No config directory, using defaults");
                return Ok(Config::default());
            }
        },
    };

    Config::load(&path).with_context(|| format!("Failed to load config '{}'", path.display()))
}

fn print_items(items: &[FeedItem]) {
    // SEC-001: feed text is untrusted, never write raw escapes to the terminal
    for item in items {
        println!("Title: {}", strip_control_chars(&item.title));
        println!("Link: {}", strip_control_chars(&item.link));
        if !item.published_date.is_empty() {
            println!("Published: {}", strip_control_chars(&item.published_date));
        }
    }
    println!("Total Items: {}", items.len());
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config)?;
    let url = args.url.unwrap_or_else(|| config.feed_url.clone());

    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .pool_max_idle_per_host(1)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .context("Failed to build HTTP client")?;

    let items = fetch_and_parse(&client, &url, &FetchOptions::from(&config))
        .await
        .with_context(|| format!("Failed to fetch or parse RSS feed '{}'", url))?;

    if args.json {
        let json = serde_json::to_string_pretty(&items).context("Failed to encode items")?;
        println!("{json}");
    } else {
        print_items(&items);
    }

    Ok(())
}
