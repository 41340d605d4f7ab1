pub mod compare;
pub mod compute;
pub mod expand;
pub mod indicators;
