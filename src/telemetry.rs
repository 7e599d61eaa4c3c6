//! Opt-in tracing setup for dashboard hosts.
//!
//! The library only emits `tracing` events. Hosts that have no subscriber of
//! their own can install a compact console one here; `RUST_LOG` wins over the
//! default directive when set.

/// Directive used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Installs a compact fmt subscriber filtered by `RUST_LOG` or `info`.
///
/// Returns `false` without the `telemetry` feature, or when a global
/// subscriber is already installed.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with_directive(DEFAULT_DIRECTIVE)
}

/// Same as [`init_default_tracing`] with a caller-chosen fallback directive,
/// e.g. `"tank_charts=debug"` to follow layout rebuilds and zoom routing.
#[must_use]
pub fn init_tracing_with_directive(fallback: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback;
        false
    }
}
