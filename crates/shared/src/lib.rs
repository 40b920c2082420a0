pub mod arithmetic;
pub mod domain;
pub mod error;
pub mod format;
pub mod protocol;
