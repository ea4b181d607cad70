//! fontconv command-line library.

pub mod batch;
pub mod cli;
pub mod io;
