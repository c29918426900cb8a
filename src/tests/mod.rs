// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod config_tests;
pub mod aggregate_tests;
pub mod sync_tests;
