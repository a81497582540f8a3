//! Property-based tests for width bookkeeping and structural round trips
