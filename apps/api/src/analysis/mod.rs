// Request orchestration: the analysis pipeline and its two front ends,
// the HTTP handler and the interactive terminal form.

pub mod form;
pub mod handlers;
pub mod pipeline;
