pub mod error;
pub mod handlers;
pub mod types;

pub use error::RecError;
pub use handlers::*;
pub use types::*;
