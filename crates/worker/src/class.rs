/// Execution classes used for task tagging and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Work whose result feeds a form the user is editing (debounced checks, predictions).
	Interactive,
	/// Refresh work that reconciles cached views against the server.
	Background,
}

impl TaskClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
		}
	}
}
