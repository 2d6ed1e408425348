// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Deduplicated interning of member names.
//!
//! A [`Node`][crate::graph::Node]'s named members are keyed by member spelling, but the same
//! spelling (`"m"`, say) shows up at many different member-access sites across a program. Rather
//! than store and re-hash a fresh `String` at each site, we intern member names once: the same
//! spelling always maps to the same [`Handle<InternedString>`], so member keys become a cheap,
//! `Copy` value.

use std::collections::HashMap;
use std::fmt;
use std::fmt::Display;

use crate::arena::Arena;
use crate::arena::Handle;

/// A single interned string.
pub struct InternedString {
    content: String,
}

impl InternedString {
    pub fn as_str(&self) -> &str {
        self.content.as_str()
    }
}

/// Owns the deduplicated table of interned strings used by a [`FlowGraph`][crate::graph::FlowGraph].
#[derive(Default)]
pub struct Interner {
    strings: Arena<InternedString>,
    handles: HashMap<String, Handle<InternedString>>,
}

impl Interner {
    pub fn new() -> Interner {
        Interner::default()
    }

    /// Interns a string, ensuring that there's only ever one copy of a particular spelling
    /// stored in the interner.
    pub fn intern<S: AsRef<str> + ?Sized>(&mut self, s: &S) -> Handle<InternedString> {
        let s = s.as_ref();
        if let Some(handle) = self.handles.get(s) {
            return *handle;
        }
        let handle = self.strings.add(InternedString {
            content: s.to_string(),
        });
        self.handles.insert(s.to_string(), handle);
        handle
    }

    pub fn resolve(&self, handle: Handle<InternedString>) -> &str {
        self.strings.get(handle).as_str()
    }

    /// Looks up a spelling without interning it. Used by read-only queries (like
    /// [`FlowGraph::member`][crate::graph::FlowGraph::member]) that shouldn't allocate a new
    /// interned entry just to discover that nothing is keyed by it.
    pub fn peek(&self, s: &str) -> Option<Handle<InternedString>> {
        self.handles.get(s).copied()
    }
}

pub struct DisplayInternedString<'a> {
    wrapped: Handle<InternedString>,
    interner: &'a Interner,
}

impl<'a> Display for DisplayInternedString<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.interner.resolve(self.wrapped))
    }
}

impl Handle<InternedString> {
    pub fn display(self, interner: &Interner) -> impl Display + '_ {
        DisplayInternedString {
            wrapped: self,
            interner,
        }
    }
}
