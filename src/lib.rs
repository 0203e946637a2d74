#![doc = include_str!("RUSTDOC.md")]

pub mod async_result;
pub mod util;

#[cfg(test)]
pub mod test_support;
