//! Common test utilities

use std::fs;
use std::path::Path;

use stormtrack::config::Config;

/// Test fixture paths
#[allow(dead_code)]
pub const FIXTURES_DIR: &str = "tests/fixtures/html";

/// Load an HTML fixture by filename
#[allow(dead_code)]
pub fn load_fixture(filename: &str) -> String {
    let path = format!("{FIXTURES_DIR}/{filename}");
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to load fixture: {path}"))
}

/// Configuration pointing the crawler at a mock archive and a temp tree
#[allow(dead_code)]
pub fn test_config(server_uri: &str, raw_dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.base_url = format!("{server_uri}/archive/");
    config.crawler.rate_limit = 100;
    config.crawler.request_timeout_secs = 5;
    config.crawler.download_delay_ms = 0;
    config.output.raw_dir = raw_dir.to_path_buf();
    config
}

/// Create a file (and its parents) with the given content
#[allow(dead_code)]
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}
