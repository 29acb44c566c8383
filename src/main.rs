use anyhow::{Context, Result, bail};
use drive_client::{
    AppState,
    config::{ClientConfig, Command, UrlKind},
    format::{format_bytes, format_timestamp, usage_percent},
    models::{Category, LocalFile, Notification, NotificationKind, UploadTask},
    services::DeleteOutcome,
};
use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    time::Duration,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // --- Parse config + command ---
    let (cfg, command) = ClientConfig::from_env_and_args()?;
    tracing::debug!("Starting drive client with config: {:?}", cfg);

    // --- Wire client state ---
    let (state, notifications) =
        AppState::from_config(&cfg).context("initializing remote store client")?;
    let printer = tokio::spawn(print_notifications(notifications));

    let result = run(&state, command).await;

    // Dropping the state closes the notification channel so the printer drains and exits.
    drop(state);
    if let Err(err) = printer.await {
        tracing::warn!("notification printer stopped: {}", err);
    }

    result
}

async fn run(state: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Ls { category, search } => list(state, category, search).await,
        Command::Quota => quota(state).await,
        Command::Upload { paths } => upload(state, paths).await,
        Command::Rm { name, yes } => remove(state, &name, yes).await,
        Command::Url { kind, name } => {
            let url = match kind {
                UrlKind::Download => state.download_url(&name),
                UrlKind::Preview => state.preview_url(&name),
            };
            println!("{}", url);
            Ok(())
        }
    }
}

async fn list(state: &AppState, category: Category, search: String) -> Result<()> {
    state.refresh().await.context("loading file list")?;
    state.select_category(category);
    state.set_search(search);

    let files = state.visible_files();
    if files.is_empty() {
        println!("No files in {}", category);
        return Ok(());
    }
    for file in files {
        println!(
            "{:<40} {:>10}  {}  {}",
            file.name,
            format_bytes(file.size_bytes),
            format_timestamp(file.modified_at),
            file.mime_type
        );
    }
    Ok(())
}

async fn quota(state: &AppState) -> Result<()> {
    let snapshot = state.refresh().await.context("loading storage quota")?;
    let quota = snapshot.quota;
    println!(
        "{} of {} used ({:.1}%), {} free",
        format_bytes(quota.used_bytes),
        format_bytes(quota.total_bytes),
        usage_percent(&quota),
        format_bytes(quota.free_bytes)
    );
    Ok(())
}

async fn upload(state: &AppState, paths: Vec<PathBuf>) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    let mut unreadable = 0usize;
    for path in paths {
        match LocalFile::open(&path).await {
            Ok(file) => files.push(file),
            Err(err) => {
                unreadable += 1;
                eprintln!("skipping {}: {}", path.display(), err);
            }
        }
    }
    if files.is_empty() {
        bail!("no readable files to upload");
    }

    let total = files.len();
    let batch = state.upload(files);
    tokio::pin!(batch);
    let mut ticker = tokio::time::interval(PROGRESS_INTERVAL);
    let report = loop {
        tokio::select! {
            report = &mut batch => break report,
            _ = ticker.tick() => render_progress(&state.upload_progress()),
        }
    };

    let failed = report.failed().count();
    println!(
        "{} of {} uploaded{}",
        total - failed,
        total,
        if report.refreshed { "" } else { " (file list may be stale)" }
    );
    if failed + unreadable > 0 {
        bail!("{} file(s) were not uploaded", failed + unreadable);
    }
    Ok(())
}

async fn remove(state: &AppState, name: &str, yes: bool) -> Result<()> {
    let confirm = |name: &str| yes || prompt_yes_no(&format!("Delete {}? [y/N] ", name));
    match state.delete(name, confirm).await {
        Ok(DeleteOutcome::Deleted) => Ok(()),
        Ok(DeleteOutcome::Declined) => {
            println!("Left {} in place", name);
            Ok(())
        }
        Err(err) => Err(err).with_context(|| format!("deleting {}", name)),
    }
}

fn prompt_yes_no(question: &str) -> bool {
    print!("{}", question);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn render_progress(tasks: &[UploadTask]) {
    for task in tasks {
        eprintln!("  {:>3}%  {}", task.percent_complete, task.id.name);
    }
}

async fn print_notifications(mut rx: UnboundedReceiver<Notification>) {
    while let Some(note) = rx.recv().await {
        match note.kind {
            NotificationKind::Success => println!("✓ {}", note.message),
            NotificationKind::Failure => eprintln!("✗ {}", note.message),
        }
    }
}
