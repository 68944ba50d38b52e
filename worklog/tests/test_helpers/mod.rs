pub mod fake_tracker;
