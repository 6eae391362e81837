//! Ledger engine for shared group expenses.
//!
//! The engine turns a recorded expense into per-member settlements, keeps
//! them consistent across edits and member removal, and aggregates them into
//! dashboards, history views, statistics and reminder groupings. Web, CLI
//! and scheduler collaborators call into [`Ledger`] with an explicit acting
//! member id; the engine never relies on ambient request state.

pub use error::LedgerError;
pub use expenses::Expense;
pub use members::Member;
pub use ops::{
    Dashboard, HistoryFilter, Ledger, LedgerBuilder, MemberStatistics, MonthlyTotal, PaidStatus,
    ReminderEntry, ReminderGroup, RosterLine,
};
pub use settlements::Settlement;
pub use split::{AMOUNT_EPSILON, Split};

mod error;
mod expenses;
mod members;
mod ops;
mod reminder_scans;
mod settlements;
mod split;

type LedgerResult<T> = Result<T, LedgerError>;
