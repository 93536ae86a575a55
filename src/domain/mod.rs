// Domain layer: package model and the ports (courier adapters, storage) the rest of the crate plugs into.

pub mod model;
pub mod ports;
