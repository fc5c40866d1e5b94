pub mod push;
pub mod test_push;
pub mod version;
