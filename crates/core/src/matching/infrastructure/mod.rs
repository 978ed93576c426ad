pub mod json_file_matcher;
pub mod matcher_response_parser;
pub mod transcript_file_reader;
