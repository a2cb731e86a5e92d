//! ResourceArc Wrappers
//!
//! Configured printers held by the BEAM, plus the cache behind the
//! one-shot NIF.

use std::num::NonZeroUsize;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use lru::LruCache;
use rustler::ResourceArc;

use crate::config::PrinterConfig;
use crate::error::ConfigError;
use crate::printer::PrettyPrinter;

/// Printers kept for one-shot calls.
const CACHE_CAPACITY: usize = 32;

static PRINTER_CACHE: LazyLock<Mutex<LruCache<PrinterConfig, Arc<PrettyPrinter>>>> =
    LazyLock::new(|| {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Mutex::new(LruCache::new(capacity))
    });

/// Wrapper for PrettyPrinter that can be stored in a ResourceArc.
/// The printer is immutable, so no lock is needed around it.
pub struct PrinterResource {
    pub printer: Arc<PrettyPrinter>,
}

impl PrinterResource {
    pub fn new(config: PrinterConfig) -> Result<Self, ConfigError> {
        cached_printer(config).map(|printer| PrinterResource { printer })
    }
}

#[rustler::resource_impl]
impl rustler::Resource for PrinterResource {}

/// Type alias for the ResourceArc
pub type PrinterRef = ResourceArc<PrinterResource>;

/// Fetch the printer for `config`, building and caching it on a miss.
///
/// Invalid configurations are not cached. A poisoned lock is recovered,
/// since the cache only holds finished printers.
pub fn cached_printer(config: PrinterConfig) -> Result<Arc<PrettyPrinter>, ConfigError> {
    if let Some(printer) = PRINTER_CACHE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&config)
    {
        return Ok(Arc::clone(printer));
    }

    // built outside the lock; a racing miss only builds a duplicate
    let printer = Arc::new(PrettyPrinter::new(config.clone())?);
    PRINTER_CACHE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .put(config, Arc::clone(&printer));
    Ok(printer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_returns_same_printer() {
        let config = PrinterConfig {
            indentation_multiplier: 7,
            ..PrinterConfig::default()
        };
        let first = cached_printer(config.clone()).unwrap();
        let second = cached_printer(config).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_cache_rejects_invalid_config() {
        let config = PrinterConfig {
            robustness: true,
            ..PrinterConfig::default()
        };
        assert_eq!(
            cached_printer(config).err(),
            Some(ConfigError::RobustnessWithoutTarget)
        );
    }
}
