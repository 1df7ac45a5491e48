mod ability;
mod location;
mod seed;

pub use ability::*;
pub use location::*;
pub use seed::*;
