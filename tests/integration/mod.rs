//! Integration tests for the slipway binary
//!
//! Each test builds a real git repository (with a local bare remote and a
//! local artifact directory) and drives the compiled binary end to end.

mod helpers;
mod test_init;
mod test_plan;
mod test_release;
