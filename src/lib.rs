//! Cross-crate integration tests for the PiCalc-rs workspace live in `tests/`.
