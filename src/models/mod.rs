pub mod loaders;
pub mod problem;
pub mod route;

pub use loaders::{load_cities, CityCatalog};
pub use problem::{City, CityId, DemandMap, ProblemParams, ProblemParamsPatch};
pub use route::{palette_color, Route, SolverResult, SolverTotals, ROUTE_PALETTE};
