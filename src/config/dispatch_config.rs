//! config/dispatch_config.rs
//! Configuración del worker de despacho (tamaño de lote, periodo de polling).

use serde::{Deserialize, Serialize};

/// Parámetros del worker, con valores por defecto
/// (pueden venir del .env).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Máximo de entradas `pending` reclamadas por tick.
    pub batch_size: i64,
    /// Periodo base entre ticks, en segundos.
    pub poll_interval_secs: u64,
    /// Ticks vacíos consecutivos antes de empezar a duplicar el periodo.
    pub backoff_after_empty_ticks: u32,
    /// Techo del periodo cuando hay backoff, en segundos.
    pub max_poll_interval_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            batch_size: 5,
            poll_interval_secs: 10,
            backoff_after_empty_ticks: 3,
            max_poll_interval_secs: 60,
        }
    }
}

impl DispatchConfig {
    pub fn from_env() -> Self {
        let defaults = DispatchConfig::default();
        DispatchConfig {
            batch_size: env_parse("DISPATCH_BATCH_SIZE", defaults.batch_size),
            poll_interval_secs: env_parse("DISPATCH_POLL_SECS", defaults.poll_interval_secs),
            backoff_after_empty_ticks: env_parse(
                "DISPATCH_BACKOFF_AFTER_EMPTY",
                defaults.backoff_after_empty_ticks,
            ),
            max_poll_interval_secs: env_parse(
                "DISPATCH_MAX_POLL_SECS",
                defaults.max_poll_interval_secs,
            ),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Valor inválido en {}: {:?}, se usa el default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
