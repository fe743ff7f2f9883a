//! Process exit codes
//!
//! A remote API failure exits with the remote status code itself; the
//! reserved values below sit outside the ranges the remote service uses.

/// Successful termination
pub const OK: i32 = 0;

/// Anything not covered by the other classes
pub const UNEXPECTED: i32 = 100;

/// Command line input failed validation
pub const INVALID_ARGUMENT: i32 = 101;

/// Network or response processing failure before a structured error was obtained
pub const TRANSPORT: i32 = 102;
