//! Text utilities shared by the message loop and the command line.

pub mod grouping;
