use std::collections::HashMap;
use std::fmt::Display;

// -------------------------------------------------------------------------------------------------------

/// A caller-supplied completion capability. Invoked with the ordered reply
/// fields, at most once. `FnOnce` plus removal-on-resolve make a second
/// invocation unrepresentable.
pub type ReplyCallback = Box<dyn FnOnce(Vec<String>) + Send>;

/// Correlation token tying an outbound call to its eventual inbound reply.
///
/// Format on the wire: `<functionName><decimal counter>`, e.g.
/// `connectToFlux0`. The counter is shared across all function names, so
/// tokens are unique process-wide, not per function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallToken(String);

impl CallToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for CallToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -------------------------------------------------------------------------------------------------------

/// The correlation table: token -> pending callback, plus the token counter.
///
/// Constructed once per bridge session and owned by the bridge actor, whose
/// message loop serializes `register` against `resolve`. The counter never
/// resets, so a token is never reused for the lifetime of the session.
///
/// There is no cancellation: an entry whose reply never arrives stays in the
/// table until the session ends, and its callback is never invoked.
pub struct CallRegistry {
    pending: HashMap<String, ReplyCallback>,
    next_call_id: u64,
}

impl CallRegistry {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            next_call_id: 0,
        }
    }

    /// Stores `callback` under a fresh token and returns the token.
    pub fn register(&mut self, function: &str, callback: ReplyCallback) -> CallToken {
        let token = format!("{function}{}", self.next_call_id);
        self.next_call_id += 1;
        self.pending.insert(token.clone(), callback);
        CallToken(token)
    }

    /// Removes and returns the callback for `token`. Lookup and removal are
    /// one operation, so nothing can observe the entry in between. `None`
    /// means the token was already resolved, never registered, or malformed;
    /// that is a reportable condition, not a crash.
    pub fn resolve(&mut self, token: &str) -> Option<ReplyCallback> {
        self.pending.remove(token)
    }

    /// Number of calls still waiting for a reply.
    pub fn pending_calls(&self) -> usize {
        self.pending.len()
    }
}

impl Default for CallRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// -------------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------------
