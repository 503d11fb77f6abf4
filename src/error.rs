use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// The connection could not be created at all (invalid endpoint, no async runtime).
    /// Never retried.
    Construction,
    /// Error related to the underlying WebSocket transport
    WebSocket,
    /// An inbound frame could not be decoded into a message
    Parse,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    backtrace: Backtrace,
}

impl Error {
    pub fn with_source<S: StdError + Send + Sync + 'static>(kind: Kind, source: S) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            backtrace: Backtrace::capture(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    #[must_use]
    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        let e = self.source.as_deref()?;
        e.downcast_ref::<E>()
    }

    /// Error for custom [`Transport::validate`](crate::ws::Transport::validate)
    /// implementations rejecting an endpoint.
    pub fn construction<S: Into<String>>(message: S) -> Self {
        Construction {
            reason: message.into(),
        }
        .into()
    }

    /// Error for custom [`MessageParser`](crate::ws::MessageParser)s rejecting a frame.
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Malformed {
            reason: message.into(),
        }
        .into()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{:?}: {}", self.kind, src),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Reason a connection could not be constructed.
#[non_exhaustive]
#[derive(Debug)]
pub struct Construction {
    pub reason: String,
}

impl fmt::Display for Construction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unable to construct connection: {}", self.reason)
    }
}

impl StdError for Construction {}

impl From<Construction> for Error {
    fn from(err: Construction) -> Self {
        Error::with_source(Kind::Construction, err)
    }
}

/// An inbound frame that could not be decoded.
#[non_exhaustive]
#[derive(Debug)]
pub struct Malformed {
    pub reason: String,
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed frame: {}", self.reason)
    }
}

impl StdError for Malformed {}

impl From<Malformed> for Error {
    fn from(err: Malformed) -> Self {
        Error::with_source(Kind::Parse, err)
    }
}

// Endpoints are only parsed while constructing a connection.
impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::with_source(Kind::Construction, e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::with_source(Kind::Parse, e)
    }
}

impl From<tokio::runtime::TryCurrentError> for Error {
    fn from(e: tokio::runtime::TryCurrentError) -> Self {
        Error::with_source(Kind::Construction, e)
    }
}
