//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the server end to end
//! against mock devices over an in-process loopback link.

mod encoder_tests;
mod mock_device;
mod server_tests;
