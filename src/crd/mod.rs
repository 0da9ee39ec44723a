mod test_definition;
mod test_suite;

pub use test_definition::*;
pub use test_suite::*;
