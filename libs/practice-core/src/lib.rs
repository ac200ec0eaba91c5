//! Core practice domain library shared by the backend service.
//!
//! Provides:
//! - Score and statistics computation for finished practices
//! - Calendar-day and timestamp formatting in the reference time zone
//! - Shared types (PracticeType, PracticeStats)

pub mod dates;
pub mod scoring;
pub mod types;

pub use dates::{now_stamp, stamp_date, stamp_datetime, today_stamp};
pub use scoring::{compute_practice_score, compute_practice_stats};
pub use types::{PracticeStats, PracticeType};
