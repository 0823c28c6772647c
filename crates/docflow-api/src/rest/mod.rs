//! REST surface: schemas, handlers, middleware, and the router.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod schemas;
