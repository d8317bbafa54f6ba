#![allow(dead_code)]

pub use shellrunner_test_utils::{init_tracing, with_timeout};

use shellrunner::exec::LocalProcessBackend;
use shellrunner_test_utils::builders::ConfigFileBuilder;

/// Local backend on plain `sh -c`, independent of the user's login profile.
pub fn sh_backend() -> LocalProcessBackend {
    let cfg = ConfigFileBuilder::new().shell("sh", "-c").build();
    LocalProcessBackend::new(&cfg.local)
}
