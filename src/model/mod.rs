mod candidate;
mod detail;

pub use candidate::*;
pub use detail::*;
