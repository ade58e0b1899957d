pub mod geo;

pub use geo::haversine_km;
