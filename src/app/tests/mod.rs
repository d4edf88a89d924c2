//! Tests for the `dstate` command line
