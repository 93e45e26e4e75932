use std::time::Instant;

use crate::options::LogSettings;

pub(crate) const TARGET: &str = "sqlx_mysqli::stmt";

// `tracing` doesn't support dynamic levels
// https://github.com/tokio-rs/tracing/issues/372
macro_rules! private_tracing_dynamic_enabled {
    (target: $target:expr, $level:expr) => {{
        use ::tracing::Level;

        match $level {
            Level::ERROR => ::tracing::enabled!(target: $target, Level::ERROR),
            Level::WARN => ::tracing::enabled!(target: $target, Level::WARN),
            Level::INFO => ::tracing::enabled!(target: $target, Level::INFO),
            Level::DEBUG => ::tracing::enabled!(target: $target, Level::DEBUG),
            Level::TRACE => ::tracing::enabled!(target: $target, Level::TRACE),
        }
    }};
}

macro_rules! private_tracing_dynamic_event {
    (target: $target:expr, $level:expr, $($args:tt)*) => {{
        use ::tracing::Level;

        match $level {
            Level::ERROR => ::tracing::event!(target: $target, Level::ERROR, $($args)*),
            Level::WARN => ::tracing::event!(target: $target, Level::WARN, $($args)*),
            Level::INFO => ::tracing::event!(target: $target, Level::INFO, $($args)*),
            Level::DEBUG => ::tracing::event!(target: $target, Level::DEBUG, $($args)*),
            Level::TRACE => ::tracing::event!(target: $target, Level::TRACE, $($args)*),
        }
    }};
}

pub(crate) fn level_filter_to_levels(filter: log::LevelFilter) -> Option<(tracing::Level, log::Level)> {
    let tracing_level = match filter {
        log::LevelFilter::Error => Some(tracing::Level::ERROR),
        log::LevelFilter::Warn => Some(tracing::Level::WARN),
        log::LevelFilter::Info => Some(tracing::Level::INFO),
        log::LevelFilter::Debug => Some(tracing::Level::DEBUG),
        log::LevelFilter::Trace => Some(tracing::Level::TRACE),
        log::LevelFilter::Off => None,
    };

    tracing_level.zip(filter.to_level())
}

/// Logs one execution of a plain query or a prepared statement when dropped.
pub(crate) struct StmtLogger {
    sql: String,
    params: usize,
    long_data_bytes: usize,
    rows_returned: u64,
    rows_affected: u64,
    failed: bool,
    start: Instant,
    settings: LogSettings,
}

impl StmtLogger {
    pub(crate) fn new(sql: &str, params: usize, settings: &LogSettings) -> Self {
        Self {
            sql: sql.to_owned(),
            params,
            long_data_bytes: 0,
            rows_returned: 0,
            rows_affected: 0,
            failed: false,
            start: Instant::now(),
            settings: settings.clone(),
        }
    }

    pub(crate) fn long_data_bytes(&mut self, n: usize) {
        self.long_data_bytes = n;
    }

    pub(crate) fn rows_returned(&mut self, n: u64) {
        self.rows_returned = n;
    }

    pub(crate) fn rows_affected(&mut self, n: u64) {
        self.rows_affected = n;
    }

    pub(crate) fn failed(&mut self) {
        self.failed = true;
    }

    fn finish(&self) {
        let elapsed = self.start.elapsed();

        let was_slow = elapsed >= self.settings.slow_statements_duration;

        let lvl = if was_slow {
            self.settings.slow_statements_level
        } else {
            self.settings.statements_level
        };

        let Some((tracing_level, log_level)) = level_filter_to_levels(lvl) else {
            return;
        };

        // The enabled level could be set from either tracing world or log world, so check both
        let enabled = log::log_enabled!(target: TARGET, log_level)
            || private_tracing_dynamic_enabled!(target: TARGET, tracing_level);

        if !enabled {
            return;
        }

        let summary = parse_query_summary(&self.sql);

        if was_slow {
            private_tracing_dynamic_event!(
                target: TARGET,
                tracing_level,
                summary,
                db.statement = self.sql,
                params = self.params,
                long_data_bytes = self.long_data_bytes,
                rows_affected = self.rows_affected,
                rows_returned = self.rows_returned,
                failed = self.failed,
                ?elapsed,
                elapsed_secs = elapsed.as_secs_f64(),
                slow_threshold = ?self.settings.slow_statements_duration,
                "slow statement: execution time exceeded alert threshold"
            );
        } else {
            private_tracing_dynamic_event!(
                target: TARGET,
                tracing_level,
                summary,
                db.statement = self.sql,
                params = self.params,
                long_data_bytes = self.long_data_bytes,
                rows_affected = self.rows_affected,
                rows_returned = self.rows_returned,
                failed = self.failed,
                ?elapsed,
                elapsed_secs = elapsed.as_secs_f64(),
            );
        }
    }
}

impl Drop for StmtLogger {
    fn drop(&mut self) {
        self.finish();
    }
}

pub(crate) fn parse_query_summary(sql: &str) -> String {
    // For now, just take the first 4 words
    sql.split_whitespace()
        .take(4)
        .collect::<Vec<&str>>()
        .join(" ")
}

#[test]
fn it_summarizes_statements() {
    assert_eq!(
        parse_query_summary("INSERT INTO test_026_table_1\n    VALUES (?,?)"),
        "INSERT INTO test_026_table_1 VALUES"
    );
    assert_eq!(parse_query_summary("  SELECT 1 "), "SELECT 1");
}

#[test]
fn it_maps_off_to_no_level() {
    assert!(level_filter_to_levels(log::LevelFilter::Off).is_none());
    assert_eq!(
        level_filter_to_levels(log::LevelFilter::Debug),
        Some((tracing::Level::DEBUG, log::Level::Debug))
    );
}
