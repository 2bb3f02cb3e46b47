//! End-to-end tests for the zkauth workflows.
//!
//! `http_flows` drives the screens over HTTP against a scripted stub of
//! the registration service; `fake_flows` uses the in-memory registry
//! where request timing has to be controlled.

mod harness;
mod http_flows;
mod stub_server;

pub use harness::TestHarness;
pub use stub_server::Reply;
