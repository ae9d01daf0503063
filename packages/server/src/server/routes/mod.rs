// HTTP routes
pub mod agreements;
pub mod health;
pub mod users;

pub use agreements::*;
pub use health::*;
pub use users::*;
