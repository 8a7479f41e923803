use log::LevelFilter;

/// Installs the `log` backend: `console_log` in the browser, `env_logger`
/// elsewhere. Later calls only adjust the level.
pub fn init(level: LevelFilter) {
    if install(level).is_err() {
        log::debug!("logger already installed");
    }
    log::set_max_level(level);
}

#[cfg(target_arch = "wasm32")]
fn install(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    match level.to_level() {
        Some(level) => console_log::init_with_level(level),
        None => Ok(()),
    }
}

// The backend passes everything through; `log::max_level` does the gating so
// a second `init` can still widen it.
#[cfg(not(target_arch = "wasm32"))]
fn install(_level: LevelFilter) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .is_test(cfg!(test))
        .try_init()
}
