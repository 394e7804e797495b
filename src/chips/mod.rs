pub mod account_inclusion;
pub mod poseidon;
