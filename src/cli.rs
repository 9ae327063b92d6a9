//! CLI domain: parse, route, output, and presentation only.
//! Commands dispatch through one route table onto the library's services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{command_name, Cli, Commands};
pub use presentation::{
    format_frames_json, format_generation_json, format_phase_text, format_validation_json,
    format_validation_text,
};
pub use route::RunContext;
