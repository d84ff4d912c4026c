// Interface adapters: HTTP protocol, handlers, routing, and store adapters.

pub mod handlers;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod stores;
