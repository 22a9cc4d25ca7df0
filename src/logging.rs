/// Filter used when neither an explicit filter nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Initializes the global logger.
///
/// `filter` follows the `env_logger` syntax and takes precedence over `RUST_LOG`.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(filter: Option<&str>) {
    let mut builder = match filter {
        Some(filter) => {
            let mut builder = env_logger::Builder::new();
            builder.parse_filters(filter);
            builder
        }
        None => env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(DEFAULT_FILTER),
        ),
    };

    if builder.try_init().is_ok() {
        log::debug!("logging initialized");
    }
}
