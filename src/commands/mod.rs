// src/commands/mod.rs

pub mod check;
pub mod cms;
pub mod prep;
pub mod process;
pub mod render_test;

use std::path::Path;

use crate::config::Settings;
use crate::plot_functions::time_series_chart::RenderContext;

/// Name used as output file prefix and chart heading: the data directory's own name.
pub fn root_name(data_dir: &Path) -> String {
    data_dir
        .canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(data_dir)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "telemetry".to_string())
}

pub fn render_context(settings: &Settings, root_name: String) -> RenderContext {
    RenderContext {
        output_dir: settings.output.directory.clone(),
        root_name,
        plot_size: settings.plot_size(),
        colors: settings.color_map(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_name() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("site_a");
        std::fs::create_dir(&data).unwrap();
        assert_eq!(root_name(&data), "site_a");
        assert_eq!(root_name(Path::new("/definitely/not/here/meter_b")), "meter_b");
    }
}
