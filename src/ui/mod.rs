pub mod logger;
pub mod spinner;

pub use logger::Logger;
pub use spinner::{Progress, Spinner};
