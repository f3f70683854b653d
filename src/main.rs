use std::{
    fs::File,
    io::stdout,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use redmark::annotation::{Annotation, AnnotationId};
use redmark::engine::LocalEngine;
use redmark::event_source::KeyboardEventSource;
use redmark::main_app::{App, run_app_with_event_source};
use redmark::panic_handler::initialize_panic_handler;
use redmark::settings::Settings;
use redmark::store::AnnotationStore;
use redmark::theme;

#[derive(Parser)]
#[command(
    name = "redmark",
    version,
    about = "Terminal review panel for marked redaction annotations"
)]
struct Cli {
    /// Annotation set to review, as a JSON array. A sample set is shown when
    /// omitted.
    file: Option<PathBuf>,

    /// Log file path
    #[arg(long, default_value = "redmark.log")]
    log_file: PathBuf,

    /// Verbose logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    WriteLogger::init(
        if cli.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        Config::default(),
        File::create(&cli.log_file)?,
    )?;
    initialize_panic_handler();

    info!("Starting redmark");

    let settings = Settings::load();
    theme::set_theme_by_name(&settings.theme);

    let annotations = match &cli.file {
        Some(path) => load_annotations(path)?,
        None => sample_annotations(),
    };
    let engine = LocalEngine::new(AnnotationStore::from_annotations(annotations));

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(engine, settings);
    let mut events = KeyboardEventSource;
    let res = run_app_with_event_source(&mut terminal, &mut app, &mut events);

    app.settings.save();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {err:?}");
        println!("{err:?}");
    }

    info!("Shutting down redmark");
    Ok(())
}

fn load_annotations(path: &Path) -> Result<Vec<Annotation>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let annotations: Vec<Annotation> = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse annotations from {}", path.display()))?;
    info!(
        "loaded {} annotations from {}",
        annotations.len(),
        path.display()
    );
    Ok(annotations)
}

/// A small marked-up document to demo the panel without an input file.
fn sample_annotations() -> Vec<Annotation> {
    let now = Utc::now();
    let mut annotations = Vec::new();

    let texts = [
        (1, 1, Some("account number 4411-0392")),
        (2, 1, Some("Jane Doe, 14 Elm Street")),
        (3, 2, None),
        (4, 2, Some("confidential settlement amount")),
        (5, 4, None),
        (6, 3, Some("patient record #88213")),
    ];
    for (i, (id, page, preview)) in texts.iter().enumerate() {
        let mut annotation = Annotation::new(AnnotationId(*id), *page);
        annotation.author = if i % 2 == 0 { "reviewer" } else { "counsel" }.to_string();
        annotation.created_at = now - ChronoDuration::minutes((texts.len() - i) as i64 * 17);
        annotation.text_preview = preview.map(str::to_string);
        annotations.push(annotation);
    }

    let mut full_page = Annotation::new(AnnotationId(7), 5);
    full_page.author = "reviewer".to_string();
    full_page.created_at = now;
    full_page.full_page = true;
    annotations.push(full_page);

    annotations
}
