use rustc_hash::FxHashMap;

type CallHandle = usize;

const FALLBACK_KEY_PREFIX: &str = "idx:";

/// One buffered tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallEntry {
    pub key: String,
    pub name: Option<String>,
    pub arguments: String,
    /// Registration order within the current round.
    pub ordinal: usize,
    pub provider_executed: bool,
}

impl ToolCallEntry {
    /// Parse the buffered arguments; an empty buffer is an empty object.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the buffer is not valid JSON.
    pub fn parse_input(&self) -> Result<serde_json::Value, serde_json::Error> {
        if self.arguments.trim().is_empty() {
            return Ok(serde_json::Value::Object(serde_json::Map::new()));
        }
        serde_json::from_str(&self.arguments)
    }
}

/// Outcome of [`ToolCallAccumulator::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    New,
    Existing,
}

/// Reassembles tool calls whose arguments arrive in fragments.
///
/// Vendors address fragments by call id or by a positional index once the id
/// has been seen. Entries live in an arena; the alias map resolves positional
/// indexes to the call key.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    entries: Vec<Option<ToolCallEntry>>,
    by_key: FxHashMap<String, CallHandle>,
    index_to_key: FxHashMap<u32, String>,
    next_ordinal: usize,
}

impl ToolCallAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the call key for a fragment carrying `(id?, index?)`.
    ///
    /// 1. A non-empty id is the key; with an index the alias is recorded.
    /// 2. Otherwise a known alias for the index is used.
    /// 3. Otherwise a synthetic `idx:<index>` key, stable for the call.
    pub fn resolve_key(&mut self, id: Option<&str>, index: Option<u32>) -> String {
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            if let Some(index) = index {
                if self.index_to_key.get(&index).map(String::as_str) != Some(id) {
                    self.index_to_key.insert(index, id.to_string());
                }
            }
            return id.to_string();
        }

        if let Some(index) = index {
            if let Some(key) = self.index_to_key.get(&index) {
                return key.clone();
            }
        }

        fallback_key(index)
    }

    /// Register a call under `key`, or fill in the name of an existing one.
    pub fn register(
        &mut self,
        key: &str,
        name: Option<String>,
        provider_executed: bool,
    ) -> Registration {
        if let Some(entry) = self.entry_mut(key) {
            if entry.name.is_none() {
                entry.name = name.filter(|name| !name.is_empty());
            }
            entry.provider_executed |= provider_executed;
            return Registration::Existing;
        }

        let handle = self.entries.len();
        self.entries.push(Some(ToolCallEntry {
            key: key.to_string(),
            name: name.filter(|name| !name.is_empty()),
            arguments: String::new(),
            ordinal: self.next_ordinal,
            provider_executed,
        }));
        self.next_ordinal += 1;
        self.by_key.insert(key.to_string(), handle);
        Registration::New
    }

    /// Append an argument fragment; returns `false` when `key` is unknown.
    pub fn append(&mut self, key: &str, fragment: &str) -> bool {
        match self.entry_mut(key) {
            Some(entry) => {
                entry.arguments.push_str(fragment);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ToolCallEntry> {
        let handle = *self.by_key.get(key)?;
        self.entries.get(handle)?.as_ref()
    }

    /// Remove one entry and every alias pointing at it.
    pub fn remove(&mut self, key: &str) -> Option<ToolCallEntry> {
        let handle = self.by_key.remove(key)?;
        self.index_to_key.retain(|_, aliased| aliased != key);
        self.entries.get_mut(handle)?.take()
    }

    /// Remove every open entry in first-registered order, leaving the
    /// accumulator empty.
    pub fn drain(&mut self) -> Vec<ToolCallEntry> {
        let mut drained: Vec<ToolCallEntry> = Vec::with_capacity(self.by_key.len());
        for slot in &mut self.entries {
            if let Some(entry) = slot.take() {
                self.by_key.remove(&entry.key);
                self.index_to_key.retain(|_, aliased| *aliased != entry.key);
                drained.push(entry);
            }
        }
        drained.sort_by_key(|entry| entry.ordinal);
        self.entries.clear();
        self.next_ordinal = 0;
        drained
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Position the next registered call takes within the current round.
    #[must_use]
    pub fn next_position(&self) -> u32 {
        u32::try_from(self.next_ordinal).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn alias_count(&self) -> usize {
        self.index_to_key.len()
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut ToolCallEntry> {
        let handle = *self.by_key.get(key)?;
        self.entries.get_mut(handle)?.as_mut()
    }
}

fn fallback_key(index: Option<u32>) -> String {
    match index {
        Some(index) => format!("{FALLBACK_KEY_PREFIX}{index}"),
        None => format!("{FALLBACK_KEY_PREFIX}?"),
    }
}
