pub mod backend;
pub mod link;
pub mod session;
