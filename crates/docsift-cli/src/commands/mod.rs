//! Command implementations.

pub mod complete;
pub mod run;
pub mod status;

pub use self::complete::execute_complete;
pub use self::run::{execute_run, run_batch};
pub use self::status::{collect_status, execute_status, StatusReport};
