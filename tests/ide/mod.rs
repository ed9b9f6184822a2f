pub mod tests_analysis_host;
pub mod tests_navigation;
