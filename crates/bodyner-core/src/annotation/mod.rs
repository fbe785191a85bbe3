//! Annotation tool exports and their reconciliation into gold documents.

pub mod export;
pub mod reconcile;

pub use export::{
    Completion, ExportTask, RESULT_ENTRY, ResultItem, ResultValue, load_export, parse_export,
    read_archive,
};
pub use reconcile::{ReconcileOptions, ReconcileStats, Reconciler, Reconciliation};
