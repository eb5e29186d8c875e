pub mod login;
pub mod submission;
