pub mod solver_client;

pub use solver_client::{decode_response, RawResponse, SolverBackend, SolverClient, SolverRequest, SolverResponse};
