//! logger.rs
//! Configuración del logger usando env_logger.

pub fn init_logger() {
    // Nivel vía RUST_LOG; si no está definido, "info".
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();
}
