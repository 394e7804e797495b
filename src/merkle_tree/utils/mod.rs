mod build_tree;
mod csv_parser;
mod operation_helpers;

pub use build_tree::{build_levels, compute_leaves, zero_hashes};
pub use csv_parser::parse_csv_to_accounts;
pub use operation_helpers::*;
