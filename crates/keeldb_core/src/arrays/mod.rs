pub mod array;
pub mod batch;
