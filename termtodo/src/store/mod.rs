//! Local mirror of the hosted tasks table.
//!
//! The TUI renders exclusively from this mirror. The mirror never mutates
//! on its own: every change is applied by the main loop after the service
//! confirms the corresponding write (see [`crate::sync`]).

pub mod list;

pub use list::TaskList;

/// Which slice of the mirror the board renders.
///
/// Filtering is a pure view concern: switching filters touches neither the
/// mirror nor the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    /// Every task, newest first.
    #[default]
    All,
    /// Tasks not yet completed.
    Active,
    /// Tasks marked completed.
    Completed,
}

impl Filter {
    /// Whether a task with the given completion state is visible under
    /// this filter.
    #[must_use]
    pub const fn matches(self, completed: bool) -> bool {
        match self {
            Self::All => true,
            Self::Active => !completed,
            Self::Completed => completed,
        }
    }

    /// The next filter in the `All -> Active -> Completed` cycle.
    #[must_use]
    pub const fn cycle(self) -> Self {
        match self {
            Self::All => Self::Active,
            Self::Active => Self::Completed,
            Self::Completed => Self::All,
        }
    }

    /// Short label for the board header.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
