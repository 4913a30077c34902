pub mod clipboard;
pub mod config;
pub mod hotkey;
pub mod hotkey_runtime;
pub mod logging;
pub mod model;
pub mod registry;
pub mod runtime;
pub mod search;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests {
    mod search_latency_test {
        include!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../tests/perf/search_latency_test.rs"
        ));
    }
}
