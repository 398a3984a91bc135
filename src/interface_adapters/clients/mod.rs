// The clients defined here are reqwest clients used by UI-side code to reach the route server.

pub mod api;
