use std::{fmt, sync::RwLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one analysis batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(Uuid);

impl BatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remembers the most recently started batch so results of an older one
/// can be recognized and dropped.
#[derive(Debug, Default)]
pub struct BatchTracker {
    current: RwLock<Option<BatchId>>,
}

impl BatchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> BatchId {
        let id = BatchId::new();
        if let Ok(mut current) = self.current.write() {
            *current = Some(id);
        }
        id
    }

    pub fn current(&self) -> Option<BatchId> {
        self.current.read().ok().and_then(|c| *c)
    }

    pub fn is_current(&self, id: &BatchId) -> bool {
        self.current().as_ref() == Some(id)
    }
}
