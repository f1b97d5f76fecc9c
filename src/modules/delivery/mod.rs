pub mod fanout;
pub mod publisher;
pub mod status;
