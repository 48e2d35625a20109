pub mod errors;
pub mod services;
pub mod time;
pub mod timing;

pub use errors::{LedgerError, LedgerResult, TransferError, TransferResult};
pub use time::{Clock, FixedClock, SystemClock};
pub use timing::{timed, Timed};
