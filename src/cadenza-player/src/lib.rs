mod arbiter;
mod session;

pub use arbiter::{Arbiter, Grant};
pub use session::Session;
