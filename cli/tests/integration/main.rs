//! Integration tests for testpod CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! None of them reach a cluster: they cover argument parsing, dry runs and
//! failures that happen before kubectl would be called.
