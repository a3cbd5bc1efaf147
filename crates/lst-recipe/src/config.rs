//! Run configuration

use lst_tree::MarkerPrinter;
use serde::{Deserialize, Serialize};

/// Scheduler settings for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// 1 runs strictly sequentially; more fans files out on a worker pool
    pub max_parallelism: usize,
    /// Data table accept toggle applied when a run starts; `None` keeps
    /// whatever the execution context already has
    pub accept_data_table_rows: Option<bool>,
    /// How search markers render in diffs
    pub marker_printer: MarkerPrinter,
}

impl RunConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_max_parallelism(mut self, max: usize) -> Self {
        self.max_parallelism = max.max(1);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_accept_data_table_rows(mut self, accept: bool) -> Self {
        self.accept_data_table_rows = Some(accept);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_marker_printer(mut self, marker_printer: MarkerPrinter) -> Self {
        self.marker_printer = marker_printer;
        self
    }

    #[inline]
    #[must_use]
    pub fn is_parallel(&self) -> bool {
        self.max_parallelism > 1
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_parallelism: 1,
            accept_data_table_rows: None,
            marker_printer: MarkerPrinter::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: RunConfig = serde_json::from_str(r#"{"max_parallelism": 4}"#).unwrap();
        assert_eq!(config.max_parallelism, 4);
        assert_eq!(config.accept_data_table_rows, None);
        assert!(config.is_parallel());
    }

    #[test]
    fn parallelism_is_at_least_one() {
        assert_eq!(RunConfig::new().with_max_parallelism(0).max_parallelism, 1);
    }
}
