pub mod tests_cross_file;
pub mod tests_diagnostics;
pub mod tests_import_cycles;
