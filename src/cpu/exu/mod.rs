//! Execution units
pub mod rv32i;
