//! ERP entity models.

mod debtor;
mod inventory;

pub use debtor::*;
pub use inventory::*;
