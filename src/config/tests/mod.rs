//! Tests for configuration loading and storage layout
