// Interface adapters: HTTP routing, handlers, asset serving and the gateway client.

pub mod assets;
pub mod clients;
pub mod extract;
pub mod handlers;
pub mod protocol;
pub mod routes;
pub mod state;
