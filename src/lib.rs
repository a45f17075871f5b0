pub mod hash_table;
pub mod probe;
