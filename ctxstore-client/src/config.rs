/// Configuration for the privileged context.
#[derive(Debug, Clone)]
pub struct BackgroundConfig {
    /// Reject `storageSet` values that fail a registered slot's schema.
    pub validate_writes: bool,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            validate_writes: true,
        }
    }
}

/// Configuration for a non-privileged context.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Validate values in `StorageHandle::set` before sending them.
    pub validate_writes: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            validate_writes: true,
        }
    }
}
