pub mod classify;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod emit;
pub mod error;
pub mod names;
pub mod operators;
pub mod path_de;
pub mod records;
pub mod rootnode;
pub mod schema;
pub mod variants;
