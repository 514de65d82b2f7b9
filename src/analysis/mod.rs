//! Statistics and graph building over record subsets.

pub mod aggregate;
pub mod flow;
