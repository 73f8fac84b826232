mod license;
mod user;

pub use license::*;
pub use user::*;
