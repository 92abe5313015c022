
pub mod raw;

mod processed;
pub use processed::*;

mod format;
pub use format::*;
