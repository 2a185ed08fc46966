use crate::exit_codes::ExitCode;

#[derive(Debug)]
pub enum RunError {
    InvalidInput(anyhow::Error),
    SetupFailed(anyhow::Error),
    RuntimeError(anyhow::Error),
}

impl RunError {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidInput(_) => ExitCode::InvalidInput,
            Self::SetupFailed(_) => ExitCode::SetupFailed,
            Self::RuntimeError(_) => ExitCode::RuntimeError,
        }
    }

    #[must_use]
    pub fn anyhow(&self) -> &anyhow::Error {
        match self {
            Self::InvalidInput(e) | Self::SetupFailed(e) | Self::RuntimeError(e) => e,
        }
    }
}

impl From<tablebench_core::Error> for RunError {
    fn from(err: tablebench_core::Error) -> Self {
        use tablebench_core::Error;

        match err {
            Error::CreateTable(_) => Self::SetupFailed(err.into()),
            Error::InvalidThreads
            | Error::InvalidBatchSize
            | Error::InvalidRecordSize
            | Error::InvalidRecordCount => Self::InvalidInput(err.into()),
            Error::Io(_) | Error::Join(_) => Self::RuntimeError(err.into()),
        }
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(e) | Self::SetupFailed(e) | Self::RuntimeError(e) => {
                write!(f, "{e:#}")
            }
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.anyhow().as_ref())
    }
}
