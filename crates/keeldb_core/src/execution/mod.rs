pub mod collect;
pub mod sink;
pub mod source;
