pub mod common;

mod response_handling;
