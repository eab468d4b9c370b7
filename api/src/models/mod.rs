pub mod comment;
pub mod publication;
pub mod user;
