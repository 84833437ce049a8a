use tracing::Level;

/// Level for the number of `-v` flags; warnings only by default.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs the stderr subscriber and reports whether it was installed. A subscriber that
/// is already set is kept.
pub fn init(verbosity: u8) -> bool {
    match tracing_subscriber::fmt()
        .with_max_level(level_for(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(%err, "keeping existing tracing subscriber");
            false
        }
    }
}
