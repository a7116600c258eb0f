//! Unit tests for configuration loading and precedence.
//!
//! Tests are organised into modules by functional area:
//! - `precedence`: Layer precedence tests
//! - `operation_mode`: Operation and export format parsing tests
//! - `field_resolution`: Token, base URL, filter, and export settings tests
//! - `loading`: Environment and CLI loading tests
//! - `validation`: Configuration consistency validation tests

mod operation_mode;
mod validation;
