pub mod magic_links;
pub mod users;
