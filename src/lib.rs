pub mod record;
pub mod parser;
pub mod filter;
pub mod window;
pub mod classify;
pub mod normalize;
pub mod analyzer;
pub mod recommend;
pub mod incident;
pub mod stats;
pub mod opts;

pub use analyzer::{analyze, TriageAnalyzer, TriageSummary};
pub use classify::{classify, Category};
pub use filter::{FilterBuilder, TimeRange};
pub use normalize::normalize;
pub use recommend::{recommend, Priority, Suggestion};
pub use record::{Record, Severity};
pub use window::{resolve, IncidentTrigger, IncidentWindow, InvalidTriggerError};
