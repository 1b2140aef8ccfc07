/// 1 KiB values split across the load generator's fields.
pub(crate) const DEFAULT_VALUE_SIZE: &str = "1024";
/// 10 GiB of loaded records.
pub(crate) const DEFAULT_DB_SIZE: &str = "10737418240";
pub(crate) const DEFAULT_OPS: &str = "5000000";
pub(crate) const DEFAULT_THREADS: &str = "64";
pub(crate) const DEFAULT_RESULTS_DIR: &str = "results";

/// Default config filenames checked when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["kvsweep.toml", "kvsweep.json"];
