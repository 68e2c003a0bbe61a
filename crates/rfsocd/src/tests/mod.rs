//! Test suites for the RFSoC daemon.

mod support;
