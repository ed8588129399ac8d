pub mod dates;
pub mod pipeline;
pub mod prompt;
