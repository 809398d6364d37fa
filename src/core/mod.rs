pub mod batch;
pub mod download;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;
