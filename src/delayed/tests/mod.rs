//! Tests for bucket, delayed and transactional managers
