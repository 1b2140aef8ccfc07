/// Service roles managed for the duration of one experiment.
///
/// Instances are registered as `{prefix}-{index}`, so a name prefix selects
/// every instance of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Coordinator,
    Storage,
    Strace,
    Blktrace,
}

impl Role {
    /// Teardown order: tracers stop before the servers they observe.
    pub const TEARDOWN_ORDER: [Role; 4] =
        [Role::Strace, Role::Blktrace, Role::Storage, Role::Coordinator];

    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Role::Coordinator => "pd",
            Role::Storage => "tikv",
            Role::Strace => "strace",
            Role::Blktrace => "blktrace",
        }
    }

    /// Process name matched by the forced kill. The pid captured at launch
    /// may belong to a wrapper (`sudo`, a systemd scope), so teardown goes by
    /// name.
    #[must_use]
    pub const fn process_name(self) -> &'static str {
        match self {
            Role::Coordinator => "pd-server",
            Role::Storage => "tikv-server",
            Role::Strace => "strace",
            Role::Blktrace => "blktrace",
        }
    }

    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<Role> {
        match prefix {
            "pd" => Some(Role::Coordinator),
            "tikv" => Some(Role::Storage),
            "strace" => Some(Role::Strace),
            "blktrace" => Some(Role::Blktrace),
            _ => None,
        }
    }

    #[must_use]
    pub fn service_name(self, index: usize) -> String {
        format!("{}-{}", self.prefix(), index)
    }
}

/// Splits a `{role}-{index}` service name.
#[must_use]
pub fn split_service_name(name: &str) -> Option<(&str, usize)> {
    let (role, index) = name.rsplit_once('-')?;
    let index = index.parse().ok()?;
    Some((role, index))
}
