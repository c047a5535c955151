/// Web API Handlers
///
/// This module contains the handlers for the RESTful API endpoints.
/// Each handler is responsible for processing a specific type of HTTP request,
/// extracting the necessary data, calling the appropriate repository functions,
/// and returning a properly formatted response.

mod store_handlers;
mod item_handlers;
mod tag_handlers;
mod user_handlers;

// Re-export all handlers
pub use store_handlers::*;
pub use item_handlers::*;
pub use tag_handlers::*;
pub use user_handlers::*;
