pub mod ast;
pub mod ast_printer;
pub mod error;
pub mod parser;
pub mod scanner;
pub mod scope;
pub mod token;
