mod bank;
mod loader;
pub mod schema;

pub use bank::QuestionBank;
pub use loader::{load, load_cached, DataFormatError};
