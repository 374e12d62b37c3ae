pub mod session;

pub use session::{SessionContext, SessionProvider};
