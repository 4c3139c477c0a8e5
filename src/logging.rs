//! Logger bootstrap for the demo binary and tests.
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// When `verbose` is `true`, debug messages such as per-contact dispatch and
/// timer scheduling are printed. Otherwise only info level and above are
/// shown. `RUST_LOG` takes precedence over both.
pub fn init(verbose: bool) {
    let level = level_for(verbose);
    let mut builder = Builder::from_env(Env::default().default_filter_or(level.as_str()));
    // Ticks are 16 ms apart; second resolution hides their ordering.
    builder.format_timestamp_millis();

    // Already initialised is fine: tests call this once per case.
    if builder.try_init().is_err() {
        log::trace!("logger already installed");
    }
}

const fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(true, LevelFilter::Debug)]
    #[case(false, LevelFilter::Info)]
    fn verbosity_selects_level(#[case] verbose: bool, #[case] expected: LevelFilter) {
        assert_eq!(level_for(verbose), expected);
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn init_is_idempotent(#[case] verbose: bool) {
        init(verbose);
        init(verbose);
        log::info!("logger initialised twice");
    }
}
