//! Data models for the médiathèque

pub mod loan;
pub mod media;
pub mod member;

// Re-export commonly used types
pub use loan::{CreateLoan, Loan, LoanDetails, ReturnLoan};
pub use media::{CategoryDetails, Media, MediaCategory};
pub use member::{Member, MemberShort};
