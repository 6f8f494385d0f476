pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use router::create_router;
pub use router::AppState;
pub use server::serve;
