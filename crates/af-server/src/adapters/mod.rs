//! Adapters that only make sense at the outer edge of the process.

mod dialog;

pub use dialog::TracingKycDialog;
