use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use meetup::api::MockFeedRepository;
use meetup::app::{App, Completion};
use meetup::clock::SystemClock;
use meetup::config::Settings;
use meetup::feed::FeedDetailViewModel;
use meetup::{logging, terminal, ui};
use meetup_types::PostId;

/// Meetup - feed detail viewer for the terminal
#[derive(Parser)]
#[command(name = "meetup")]
#[command(about = "Browse a meetup post, its photos and comments")]
#[command(version)]
struct Cli {
    /// Post to open
    #[arg(long, short, default_value_t = 1, env = "MEETUP_POST_ID")]
    post_id: u64,

    /// Settings file to use instead of ~/.meetup/config.toml
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,

    /// Seed for the generated feed data
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _ = dotenv::dotenv();

    let log_config = if cli.verbose {
        logging::LogConfig::verbose()
    } else {
        logging::LogConfig::default()
    };
    logging::init_logging(&log_config).context("Failed to initialize logging")?;

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    let mut mock_options = settings.mock_options()?;
    if let Some(seed) = cli.seed {
        mock_options.seed = seed;
    }
    log::info!(
        "Opening post {} (seed {}, latency {:?})",
        cli.post_id,
        mock_options.seed,
        mock_options.latency
    );

    let clock = Arc::new(SystemClock);
    let repository = Arc::new(MockFeedRepository::new(mock_options, clock.clone()));
    let view_model = FeedDetailViewModel::new(
        PostId(cli.post_id),
        repository,
        clock,
        settings.viewer()?,
        settings.feed_config(),
    )
    .with_log_config(log_config.clone());

    let mut app = App::new(view_model, log_config);
    app.start();

    let mut tui = terminal::init()?;
    let result = run(&mut tui, &mut app).await;

    app.quit();
    terminal::restore()?;
    result
}

async fn run(tui: &mut terminal::Tui, app: &mut App) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();

    while app.running {
        for job in app.take_jobs() {
            let tx = tx.clone();
            tokio::spawn(async move {
                let completion = job.run().await;
                if completion.is_live() {
                    let _ = tx.send(completion);
                }
            });
        }

        while let Ok(completion) = rx.try_recv() {
            app.apply_completion(completion);
        }

        app.clear_expired_messages();

        tui.draw(|frame| ui::render(app, frame))?;
        app.after_render();

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => app.handle_key_event(key)?,
                Event::Mouse(mouse) => app.handle_mouse_event(mouse),
                _ => {}
            }
        }
    }

    log::info!("Leaving post {}", app.view_model.post_id());
    Ok(())
}
