/// The four public operations, used to tag diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Open,
    RetrieveOne,
    RetrieveAll,
    Execute,
}

impl Operation {
    /// Fixed prefix of the single log line emitted when the operation fails.
    pub const fn failure_prefix(self) -> &'static str {
        match self {
            Operation::Open => "datatier.open() failed:",
            Operation::RetrieveOne => "datatier.retrieve_one() failed:",
            Operation::RetrieveAll => "datatier.retrieve_all() failed:",
            Operation::Execute => "datatier.execute() failed:",
        }
    }
}
