//! Interactive confirmation of tool commands

mod interactive;

pub use interactive::InteractiveApproval;
