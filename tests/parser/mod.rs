pub mod tests_parser_fixtures;
pub mod tests_parser_recovery;
