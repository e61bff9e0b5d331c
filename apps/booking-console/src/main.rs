use std::sync::Arc;

use anyhow::{Context, Result};
use dotenv::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod command;
mod render;

use booking_cell::view::{BookingView, ViewExit, ViewSettings};
use booking_cell::HttpBookingBackend;
use command::Command;
use shared_config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Logs go to stderr so they do not interleave with the page
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting hospital booking console");

    let config = AppConfig::from_env();
    if !config.is_configured() {
        anyhow::bail!("HOSPITAL_API_URL is empty");
    }
    info!("Using hospital API at {}", config.api_base_url);

    let backend = HttpBookingBackend::new(&config).context("failed to build API client")?;
    let (handle, mut task) = BookingView::mount(Arc::new(backend), ViewSettings::from_config(&config));

    // Redraw on every published snapshot
    let mut snapshots = handle.subscribe();
    let renderer = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let page = render::render(&snapshots.borrow_and_update());
            println!("{}", page);
        }
    });

    println!("{}", command::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let exit = loop {
        tokio::select! {
            exit = &mut task => break exit.context("booking view task failed")?,
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    // stdin closed, treat like leaving the page
                    drop(handle);
                    break task.await.context("booking view task failed")?;
                };

                let action = match command::parse(&line) {
                    Ok(Command::Action(action)) => action,
                    Ok(Command::Slot(pick)) => match command::resolve_slot(&pick, &handle.snapshot()) {
                        Ok(action) => action,
                        Err(e) => {
                            println!("! {}", e);
                            continue;
                        }
                    },
                    Ok(Command::Show) => {
                        println!("{}", render::render(&handle.snapshot()));
                        continue;
                    }
                    Ok(Command::Help) => {
                        println!("{}", command::HELP);
                        continue;
                    }
                    Err(e) => {
                        println!("! {}", e);
                        continue;
                    }
                };

                handle.dispatch(action).await;
            }
        }
    };

    renderer.abort();

    match exit {
        ViewExit::Navigate { route, booking_id } => {
            println!("Appointment {} booked. Continue at {}", booking_id, route.path());
        }
        ViewExit::Unmounted => {
            println!("No appointment booked.");
        }
    }

    Ok(())
}
