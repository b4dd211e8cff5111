use anyhow::Context;
use std::path::PathBuf;
use winit::event_loop::{ControlFlow, EventLoop};

mod app;
mod renderer;
mod ui;

use app::handler::AppHandler;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Optional body catalog as the first argument
    let catalog_path = std::env::args_os().nth(1).map(PathBuf::from);

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut handler = AppHandler::new(catalog_path);
    event_loop
        .run_app(&mut handler)
        .context("event loop terminated abnormally")?;

    if let Some(err) = handler.take_error() {
        return Err(anyhow::Error::new(err).context("solarvis-rs failed to start"));
    }
    Ok(())
}
