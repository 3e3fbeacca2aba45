//! Pipeline components: walk context, tree builder, file accounting, diagnostics, orchestration.

pub mod context;
pub mod error_handler;
pub mod metadata;
pub mod orchestrator;
pub mod walk;

pub use context::BuildContext;
pub use error_handler::{Diagnostic, DiagnosticKind, Diagnostics, report_diagnostics, summary_line};
pub use metadata::account_file;
pub use orchestrator::run_audit;
pub use walk::build_tree;
