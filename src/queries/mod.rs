pub mod _structs;
pub mod find_by_coordinates;
pub mod find_nearby;
pub mod find_route;
pub mod generate_text;
