//! Shared helpers for Gosp bridge integration tests.

pub mod helpers;
