//! Append-only string pool.
//!
//! Mirrors `workspace.c`'s `wk_str_push`/`wk_strappf`: all string data lives
//! in one growing buffer and strings are referenced by `(offset, len)`
//! rather than owning their own allocation. Identical strings are interned
//! so that repeated literals (a target name reused across `project()`,
//! `executable()`, `install_data()`, ...) cost one lookup instead of a new
//! allocation.

use std::collections::HashMap;

/// Reference into the pool's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrId {
    offset: u32,
    len: u32,
}

pub struct StringPool {
    buf: String,
    interned: HashMap<String, StrId>,
}

impl StringPool {
    pub fn new() -> Self {
        Self {
            buf: String::with_capacity(4096),
            interned: HashMap::new(),
        }
    }

    /// Intern `s`, appending to the tail of the buffer only on first sight.
    pub fn push(&mut self, s: &str) -> StrId {
        if let Some(id) = self.interned.get(s) {
            return *id;
        }
        let offset = self.buf.len() as u32;
        self.buf.push_str(s);
        let id = StrId {
            offset,
            len: s.len() as u32,
        };
        self.interned.insert(s.to_string(), id);
        id
    }

    pub fn get(&self, id: StrId) -> &str {
        &self.buf[id.offset as usize..(id.offset + id.len) as usize]
    }

    /// Append `suffix` directly onto the buffer's tail when `id` already
    /// occupies the tail (no intervening interning), avoiding a copy of the
    /// existing bytes. Falls back to a full re-intern otherwise.
    pub fn push_tail(&mut self, id: StrId, suffix: &str) -> StrId {
        let is_tail = (id.offset + id.len) as usize == self.buf.len();
        if is_tail {
            let combined_start = id.offset as usize;
            self.buf.push_str(suffix);
            let new_id = StrId {
                offset: id.offset,
                len: (self.buf.len() - combined_start) as u32,
            };
            let s = self.buf[new_id.offset as usize..(new_id.offset + new_id.len) as usize]
                .to_string();
            self.interned.insert(s, new_id);
            new_id
        } else {
            let combined = format!("{}{}", self.get(id), suffix);
            self.push(&combined)
        }
    }
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_are_interned() {
        let mut pool = StringPool::new();
        let a = pool.push("hello");
        let b = pool.push("hello");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_strings_roundtrip() {
        let mut pool = StringPool::new();
        let a = pool.push("foo");
        let b = pool.push("bar");
        assert_eq!(pool.get(a), "foo");
        assert_eq!(pool.get(b), "bar");
    }

    #[test]
    fn push_tail_extends_in_place_when_at_buffer_end() {
        let mut pool = StringPool::new();
        let a = pool.push("foo");
        let combined = pool.push_tail(a, "bar");
        assert_eq!(pool.get(combined), "foobar");
    }
}
