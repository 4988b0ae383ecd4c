use std::io;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use userdash::cache::stored_stamp;
use userdash::{
    find_user, Config, DataLoader, DataSource, FileStore, HttpFetcher, KeyValueStore, Loaded,
    PageRequest, User,
};

#[derive(Parser)]
#[command(name = "userdash")]
#[command(about = "Browse dashboard users, cached locally for 24 hours")]
#[command(version)]
struct Cli {
    /// Show details for the user with this id
    user: Option<String>,

    /// Page to show (1-based)
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Rows per page
    #[arg(short = 'n', long, value_name = "ROWS")]
    rows: Option<usize>,

    /// Users endpoint (overrides config.json)
    #[arg(short, long, value_name = "URL")]
    endpoint: Option<String>,

    /// Fetch from the endpoint even if the cache is fresh
    #[arg(short, long)]
    refresh: bool,

    /// Show cache info
    #[arg(long)]
    cache_info: bool,

    /// Delete the cached dataset
    #[arg(long)]
    clear_cache: bool,

    /// Show full columns without truncation
    #[arg(short, long)]
    wide: bool,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load config")?;
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = Some(endpoint.clone());
    }
    if let Some(rows) = cli.rows {
        config.rows_per_page = rows;
    }

    let store = open_store(&config)?;

    // Handle cache operations first
    if cli.clear_cache {
        return clear_cache(&store, &config);
    }
    if cli.cache_info {
        return cache_info(&store, &config);
    }

    let request = PageRequest::new(cli.page, config.rows_per_page)?;
    let endpoint = config.require_endpoint()?.to_string();
    let loader = DataLoader::new(store, HttpFetcher::new()?);

    let Some(loaded) = loader
        .load_page::<User>(&endpoint, &config.keys(), request, cli.refresh)
        .await
        .with_context(|| format!("Failed to load users from {}", endpoint))?
    else {
        anyhow::bail!("{} did not return any users", endpoint);
    };

    if loaded.source == DataSource::Cache {
        eprintln!("Using cached users (use -r to refresh)");
    }

    if let Some(id) = &cli.user {
        return show_user(&loaded, id);
    }

    list_users(&loaded, request, cli.wide);
    Ok(())
}

fn open_store(config: &Config) -> Result<FileStore> {
    let store = match &config.cache_dir {
        Some(dir) => FileStore::with_dir(dir.clone()),
        None => FileStore::new(),
    };
    store.context("Failed to open cache directory")
}

/// Print one page of users
fn list_users(loaded: &Loaded<User>, request: PageRequest, wide: bool) {
    let total = loaded.data.all.len();
    let pages = loaded.data.total_pages(request.rows_per_page());

    if loaded.data.page.is_empty() {
        println!(
            "No users on page {} ({} users, {} page{})",
            request.current_page(),
            total,
            pages,
            if pages == 1 { "" } else { "s" }
        );
        return;
    }

    let width = if wide { usize::MAX } else { 24 };
    let id_width = loaded
        .data
        .page
        .iter()
        .map(|u| u.id.chars().count())
        .max()
        .unwrap_or(2)
        .max(2);

    println!(
        "{:<id_width$}  {:<24}  {:<24}  {:<28}  {}",
        "ID",
        "ORGANIZATION",
        "USERNAME",
        "EMAIL",
        "STATUS",
        id_width = id_width
    );
    for user in &loaded.data.page {
        println!(
            "{:<id_width$}  {:<24}  {:<24}  {:<28}  {}",
            user.id,
            truncate(user.org_name.as_deref().unwrap_or("-"), width),
            truncate(user.display_name(), width),
            truncate(user.email.as_deref().unwrap_or("-"), width.saturating_add(4)),
            user.status,
            id_width = id_width
        );
    }

    let shown_from = request.start() + 1;
    let shown_to = (request.start() + loaded.data.page.len()).min(total);
    println!(
        "\nShowing {}-{} of {} users (page {} of {})",
        shown_from,
        shown_to,
        total,
        request.current_page(),
        pages
    );
}

/// Print the details of one user from the full dataset
fn show_user(loaded: &Loaded<User>, id: &str) -> Result<()> {
    let user = find_user(&loaded.data.all, id)
        .with_context(|| format!("No user with id '{}'", id.trim()))?;

    let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

    println!("User Details");
    println!("  ID:            {}", user.id);
    println!("  Username:      {}", user.display_name());
    println!("  Organization:  {}", field(&user.org_name));
    println!("  Email:         {}", field(&user.email));
    println!("  Phone number:  {}", field(&user.phone_number));
    println!("  Date joined:   {}", field(&user.created_at));
    println!("  Status:        {}", user.status);

    Ok(())
}

/// Show cache info
fn cache_info(store: &FileStore, config: &Config) -> Result<()> {
    let keys = config.keys();

    println!("Cache directory: {}", store.cache_dir().display());
    println!("Data key:        {}", keys.data);
    println!("Timestamp key:   {}", keys.time);

    match stored_stamp(store, &keys) {
        Some(stamp) => {
            let now = Utc::now();
            let state = if stamp.is_fresh(now) { "fresh" } else { "stale" };
            println!("Fetched:         {} ({})", stamp.age_display(now), state);

            let rows = store
                .get(&keys.data)
                .and_then(|data| serde_json::from_str::<Vec<serde_json::Value>>(&data).ok())
                .map(|rows| rows.len().to_string())
                .unwrap_or_else(|| "unreadable".to_string());
            println!("Cached users:    {}", rows);
        }
        None => println!("Fetched:         never"),
    }

    println!("Total size:      {}", format_size(store.size_bytes()));
    Ok(())
}

/// Delete both keys of the cached dataset
fn clear_cache(store: &FileStore, config: &Config) -> Result<()> {
    let keys = config.keys();
    let removed_data = store.remove(&keys.data)?;
    let removed_time = store.remove(&keys.time)?;

    if removed_data || removed_time {
        println!("Cache cleared");
    } else {
        println!("Cache was already empty");
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Truncate to a maximum width in characters
fn truncate(s: &str, max_width: usize) -> String {
    if max_width == usize::MAX || s.chars().count() <= max_width {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
