//! Domain models for shortage reconciliation.

mod allocation;
mod candidate;
mod inventory;
mod missing;
mod options;

pub use allocation::*;
pub use candidate::*;
pub use inventory::*;
pub use missing::*;
pub use options::*;
