mod digest_tests;
mod snapshot_tests;
