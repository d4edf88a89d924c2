//! Tests for bitset blocks and the persistence factories

mod file_factory;
mod handle;
