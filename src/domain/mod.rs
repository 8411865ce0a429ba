//! Domain model: value objects, aggregates, events and the ports the services depend on.
pub mod aggregates;
pub mod events;
pub mod ports;
pub mod value_objects;
