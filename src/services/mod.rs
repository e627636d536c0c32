pub mod answer_matcher;
pub mod mcq_parser;
pub mod transcript_writer;

pub use answer_matcher::{correct_index, correct_letter, mark_options, option_letter};
pub use mcq_parser::{parse_mcqs, parse_mcqs_from_text};
pub use transcript_writer::TranscriptWriter;
