//! Read entities definitions.

pub mod accounts;
