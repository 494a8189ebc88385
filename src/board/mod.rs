//! Today's pipeline board: fetch, aggregate jobs into stage columns, order.

mod aggregate;
mod engine;
mod window;

pub use aggregate::{AggregationPolicy, StageColumn, StageStatus};
pub use engine::{build_summaries, BoardOptions, PipelineSummary, TITLE_WIDTH};
pub use window::{cutoff_at, parse_timezone, DEFAULT_CUTOFF_HOUR, DEFAULT_TIMEZONE};
