pub mod query;
pub mod ticket;
