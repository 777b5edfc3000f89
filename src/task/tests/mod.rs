//! Unit and service tests for the task lifecycle workflow.

mod cancellation_service_tests;
mod geo_tests;
