//! Integration tests for the parameter system
//!
//! These tests verify linking, ordering and bound evaluation over whole design spaces.

// Tests for building and querying design spaces
mod space_tests;


// Tests for the evaluation order
mod order_tests;

// Property tests for the evaluation order
mod order_properties;
