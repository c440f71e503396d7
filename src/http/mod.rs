//! HTTP routing primitives.

pub mod routes;

pub use routes::RouteModule;
