//! Integration tests for kcl-compose

mod config_loading;
mod outline_phase;
mod response_parsing;
mod retry_loop;
mod structural_validation;
mod support;
