pub mod dispatcher;
pub mod welcome;
