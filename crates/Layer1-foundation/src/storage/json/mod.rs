mod store;

pub use store::{read_file, JsonStore};
