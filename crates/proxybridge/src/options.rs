//! Bridge configuration

/// What to do when a default body cannot be bound to a call's arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackFailure {
    /// Return `BridgeError::FallbackFailed` to the caller and log it
    #[default]
    Report,
    /// Log a warning and resolve the call to the method's zero value
    Degrade,
}

impl FallbackFailure {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "report" => Some(FallbackFailure::Report),
            "degrade" => Some(FallbackFailure::Degrade),
            _ => None,
        }
    }
}

/// Options shared by every proxy an `InterfaceBridge` creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BridgeOptions {
    /// Policy for default bodies that cannot be bound
    pub fallback_failure: FallbackFailure,
}

impl BridgeOptions {
    /// Read options from the environment.
    ///
    /// `PROXYBRIDGE_FALLBACK`: `report` or `degrade`. Unknown values keep the default.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Some(policy) = std::env::var("PROXYBRIDGE_FALLBACK")
            .ok()
            .as_deref()
            .and_then(FallbackFailure::parse)
        {
            options.fallback_failure = policy;
        }
        options
    }

    pub fn with_fallback_failure(mut self, policy: FallbackFailure) -> Self {
        self.fallback_failure = policy;
        self
    }
}
