pub mod assignment;
pub mod bipartite;
pub mod candidates;
pub mod interval;
pub mod levenshtein;
pub mod segment;
