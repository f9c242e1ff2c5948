pub mod hid;
pub mod outcome;
pub mod row;

pub use hid::*;
pub use outcome::*;
pub use row::*;
