mod schema_parser;

pub use schema_parser::parser::PatternSchema;
