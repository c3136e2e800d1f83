mod common;
mod smoke_test;
