pub mod input;
pub mod recalculate_route;
pub mod reconcile;
pub mod route_dispatch;
pub mod route_fetched;
pub mod simulation_tick;
