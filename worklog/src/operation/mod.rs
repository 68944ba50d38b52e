/// The use cases of the tool, with a submodule for each one of them.
pub mod report;
