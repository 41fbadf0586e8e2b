fn main() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .with_colors(true)
        .with_threads(true)
        .with_local_timestamps()
        .init()?;

    let channels = frontal_bridge::BridgeChannels::default();
    let backend = frontal_backend::run(channels.backend_rx, channels.backend_tx);
    frontal_frontend::run(channels.frontend_rx, channels.frontend_tx)?;

    // the backend releases media once the frontend hangs up
    if backend.join().is_err() {
        log::error!("Backend thread panicked");
    }
    Ok(())
}
