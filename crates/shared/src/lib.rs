//! Types shared between the dashboard core and the desktop shell.

pub mod domain;
pub mod error;
pub mod protocol;
