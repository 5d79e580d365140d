pub mod geometry;
pub mod map_renderer;
pub mod problem_generator;
pub mod progress;
pub mod result_parser;

pub use map_renderer::{MapFrame, MapRenderer};
pub use problem_generator::{generate_problem, GeneratedProblem};
pub use progress::{ProgressSimulator, Stage};
pub use result_parser::{parse_or_output, parse_quantum_output};
