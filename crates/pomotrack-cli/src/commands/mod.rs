pub mod config;
pub mod stats;
pub mod task;
pub mod timer;

use std::rc::Rc;

use pomotrack_core::SqliteStore;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the on-disk store shared by the ledger and the task list.
pub fn open_store() -> Result<Rc<SqliteStore>, Box<dyn std::error::Error>> {
    Ok(Rc::new(SqliteStore::open()?))
}
