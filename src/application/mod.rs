//! Client-side state of the review screen: the read resources, the approval
//! list, and the controller deciding which of them is shown.

pub mod approvals;
pub mod coordinator;
pub mod resources;

pub use approvals::TransactionList;
pub use coordinator::{ViewController, ViewMode};
pub use resources::LoadState;
