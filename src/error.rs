pub type FlatshadeResult<T> = Result<T, FlatshadeError>;

#[derive(thiserror::Error, Debug)]
pub enum FlatshadeError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("reference error: {0}")]
    Reference(String),

    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlatshadeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn reference(msg: impl Into<String>) -> Self {
        Self::Reference(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Appends a `(while {what})` breadcrumb to the message without changing
    /// the variant. Nested calls build a trail from innermost to outermost.
    pub fn while_doing(self, what: impl AsRef<str>) -> Self {
        let annotate = |msg: String| format!("{msg}\n(while {})", what.as_ref());
        match self {
            Self::Validation(m) => Self::Validation(annotate(m)),
            Self::Reference(m) => Self::Reference(annotate(m)),
            Self::Geometry(m) => Self::Geometry(annotate(m)),
            Self::Io(m) => Self::Io(annotate(m)),
            Self::Parse(m) => Self::Parse(annotate(m)),
            Self::Other(e) => Self::Other(e.context(format!("while {}", what.as_ref()))),
        }
    }
}

/// Breadcrumb annotation for fallible operations; the label is only built on
/// the failure path.
pub trait ResultExt<T> {
    fn while_doing<S: AsRef<str>>(self, what: impl FnOnce() -> S) -> FlatshadeResult<T>;
}

impl<T> ResultExt<T> for FlatshadeResult<T> {
    fn while_doing<S: AsRef<str>>(self, what: impl FnOnce() -> S) -> FlatshadeResult<T> {
        self.map_err(|e| e.while_doing(what()))
    }
}
