pub mod city_loader;

pub use city_loader::{load_cities, parse_cities, CityCatalog};
