pub mod ast;
pub mod error;
pub mod parse;
pub mod resolve;
pub mod run;
pub mod table;
pub mod ty;
pub mod wgsl;

mod lex;
