pub mod profile;
pub mod user;

pub use profile::*;
pub use user::*;
