/// Receives progress events while a batch is read and validated.
pub trait ProgressHandler: Send + Sync {
    /// Called before a source table is read.
    fn on_start_table(&self, file: &str);

    /// Called once a source table has been read.
    fn on_finish_table(&self, file: &str, rows: usize);

    /// Called before a validation rule runs.
    fn on_start_rule(&self, rule_name: &str);

    /// Called after a validation rule ran.
    fn on_finish_rule(&self, rule_name: &str);

    fn set_total_tables(&self, count: usize) {
        let _ = count;
    }

    fn set_total_rules(&self, count: usize);
}

/// A no-op progress handler
pub struct NoOpProgressHandler;

impl ProgressHandler for NoOpProgressHandler {
    fn on_start_table(&self, _file: &str) {}
    fn on_finish_table(&self, _file: &str, _rows: usize) {}
    fn on_start_rule(&self, _rule_name: &str) {}
    fn on_finish_rule(&self, _rule_name: &str) {}
    fn set_total_rules(&self, _count: usize) {}
}
