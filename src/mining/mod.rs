//! Block construction and proof-of-work solving

pub mod builder;
pub mod solver;

pub use builder::{build_block, create_coinbase_tx, BlockTemplate, BuildError, Payout};
pub use solver::{solve_header, solve_header_with_workers};
