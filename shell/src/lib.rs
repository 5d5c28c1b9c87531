//! vesper - minimal browser shell
//!
//! Startup decides the cooperation role first. A secondary forwards its
//! URIs and exits; a primary or standalone instance runs the event loop
//! until the last tab and the last download are gone.

mod cli;
mod headless;
mod limits;

use std::time::Duration;

use clap::Parser;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::sync::mpsc;

use vesper_core::{fifo_path, Browser, Config, Cooperation, Event, Listener, APP_NAME};

use cli::Cli;
use headless::HeadlessEngine;

const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

pub fn run() -> anyhow::Result<()> {
    // Initialize logging
    vesper_core::init_logging();

    let cli = Cli::parse();
    limits::raise_nofile_limit();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_browser(cli, Config::from_env()))
}

async fn run_browser(cli: Cli, config: Config) -> anyhow::Result<()> {
    let cooperation = if cli.no_cooperation {
        Cooperation::Standalone
    } else {
        let path = fifo_path(&Config::runtime_dir(), APP_NAME, &config.fifo_suffix);
        Cooperation::setup(&path)
    };
    tracing::info!(role = %cooperation.role(), "Cooperation role decided");

    let (events_tx, mut events) = mpsc::unbounded_channel();
    let engine = HeadlessEngine::new(events_tx);

    let mut listener = match cooperation {
        Cooperation::Secondary(forwarder) => {
            let mut browser = Browser::new(config, engine).with_forwarder(forwarder);
            browser.open_initial(&cli.uris);
            return Ok(());
        }
        Cooperation::Primary(listener) => Some(listener),
        Cooperation::Standalone => None,
    };

    let mut browser = Browser::new(config, engine);
    browser.load_user_resources();
    browser.open_initial(&cli.uris);

    let mut interrupt = interrupt_signal()?;
    let mut sweep = tokio::time::interval(CACHE_SWEEP_INTERVAL);
    // The first tick completes immediately
    sweep.tick().await;

    tracing::info!(tabs = browser.session().len(), "vesper started");

    while browser.is_running() {
        let event = tokio::select! {
            Some(event) = events.recv() => event,
            line = next_pipe_line(&mut listener) => match line {
                Some(line) => Event::PipeLineReceived(line),
                None => continue,
            },
            _ = interrupt.recv() => Event::Shutdown,
            _ = sweep.tick() => Event::CacheSweep,
        };

        browser.handle_event(event);
    }

    if cli.dump_chrome {
        println!("{}", browser.chrome().to_json()?);
    }

    tracing::info!("vesper exiting");
    Ok(())
}

/// SIGINT stream for the whole run; an interrupt that lands while an
/// event is being handled is picked up on the next turn of the loop.
fn interrupt_signal() -> std::io::Result<Signal> {
    signal(SignalKind::interrupt())
}

/// Next forwarded URI. Never resolves without a listener; a failed
/// listener is dropped and cooperation stops for this run.
async fn next_pipe_line(listener: &mut Option<Listener>) -> Option<String> {
    let Some(reader) = listener.as_mut() else {
        return std::future::pending().await;
    };

    match reader.next_line().await {
        Ok(Some(line)) => Some(line),
        Ok(None) => {
            tracing::warn!(path = %reader.path().display(), "Cooperation pipe closed");
            *listener = None;
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Stopped reading cooperation pipe");
            *listener = None;
            None
        }
    }
}
