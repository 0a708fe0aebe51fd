//! Object arena (C2)
//!
//! Every DSL value lives in a process-wide arena owned by the [`crate::Workspace`].
//! Objects are referenced only by integer [`Handle`]; there are no internal
//! raw pointers, so the arena is relocatable and the DSL cannot construct
//! cycles (`spec.md` §3.1, §9 "Cyclic data").

mod string_pool;
mod value;

pub use string_pool::{StrId, StringPool};
pub use value::{Compiler, CompilerKind, CompilerVendor, Dependency, DepsFlavour, ExternalProgram,
    Generator, GeneratedList, BuildTarget, BothLibs, CustomTarget, Environment, FeatureOption, Obj,
    RunResult, TargetKind};

use indexmap::IndexMap;

/// Index into the object arena. Handle `0` is always the singleton `null`.
pub type Handle = u32;

/// The object arena: owns every DSL value ever created during evaluation.
pub struct Arena {
    objs: Vec<Obj>,
    pub strings: StringPool,
}

impl Arena {
    pub fn new() -> Self {
        let mut objs = Vec::with_capacity(1024);
        objs.push(Obj::Null); // handle 0
        Self {
            objs,
            strings: StringPool::new(),
        }
    }

    pub fn make(&mut self, obj: Obj) -> Handle {
        let h = self.objs.len() as Handle;
        self.objs.push(obj);
        h
    }

    pub fn get(&self, h: Handle) -> &Obj {
        &self.objs[h as usize]
    }

    pub fn get_mut(&mut self, h: Handle) -> &mut Obj {
        &mut self.objs[h as usize]
    }

    pub fn null() -> Handle {
        0
    }

    pub fn make_string(&mut self, s: &str) -> Handle {
        let id = self.strings.push(s);
        self.make(Obj::Str(id))
    }

    pub fn make_file(&mut self, absolute_path: &str) -> Handle {
        let id = self.strings.push(absolute_path);
        self.make(Obj::File(id))
    }

    pub fn make_bool(&mut self, b: bool) -> Handle {
        self.make(Obj::Bool(b))
    }

    pub fn make_int(&mut self, n: i64) -> Handle {
        self.make(Obj::Number(n))
    }

    pub fn make_array(&mut self, items: Vec<Handle>) -> Handle {
        self.make(Obj::Array(items))
    }

    pub fn make_dict(&mut self) -> Handle {
        self.make(Obj::Dict(IndexMap::new()))
    }

    /// Stringify an object's printable representation (used by `message`,
    /// string concatenation coercion, and f-string interpolation).
    pub fn display(&self, h: Handle) -> String {
        match self.get(h) {
            Obj::Null => "null".to_string(),
            Obj::Bool(b) => b.to_string(),
            Obj::Number(n) => n.to_string(),
            Obj::Str(id) | Obj::File(id) => self.strings.get(*id).to_string(),
            Obj::Array(items) => {
                let parts: Vec<String> = items.iter().map(|h| self.display_quoted(*h)).collect();
                format!("[{}]", parts.join(", "))
            }
            Obj::Dict(map) => {
                let parts: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("'{}': {}", k, self.display_quoted(*v)))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            _ => format!("<{}>", self.kind_name(h)),
        }
    }

    fn display_quoted(&self, h: Handle) -> String {
        match self.get(h) {
            Obj::Str(id) => format!("'{}'", self.strings.get(*id)),
            _ => self.display(h),
        }
    }

    pub fn kind_name(&self, h: Handle) -> &'static str {
        match self.get(h) {
            Obj::Null => "void",
            Obj::Bool(_) => "bool",
            Obj::Number(_) => "int",
            Obj::Str(_) => "str",
            Obj::File(_) => "file",
            Obj::Array(_) => "array",
            Obj::Dict(_) => "dict",
            Obj::Compiler(_) => "compiler",
            Obj::Dependency(_) => "dep",
            Obj::ExternalProgram(_) => "external_program",
            Obj::BuildTarget(_) => "build_tgt",
            Obj::CustomTarget(_) => "custom_tgt",
            Obj::BothLibs(_) => "both_libs",
            Obj::Generator(_) => "generator",
            Obj::GeneratedList(_) => "generated_list",
            Obj::Environment(_) => "environment",
            Obj::RunResult(_) => "run_result",
            Obj::FeatureOption(_) => "feature",
            Obj::Meson => "meson",
            Obj::Subproject(_) => "subproject",
        }
    }

    // ---- array operations ----

    pub fn array_push(&mut self, arr: Handle, item: Handle) {
        if let Obj::Array(v) = self.get_mut(arr) {
            v.push(item);
        }
    }

    pub fn array_extend(&mut self, arr: Handle, other: Handle) {
        let items = match self.get(other) {
            Obj::Array(v) => v.clone(),
            _ => vec![other],
        };
        if let Obj::Array(v) = self.get_mut(arr) {
            v.extend(items);
        }
    }

    pub fn array_items(&self, arr: Handle) -> Vec<Handle> {
        match self.get(arr) {
            Obj::Array(v) => v.clone(),
            _ => vec![arr],
        }
    }

    pub fn array_len(&self, arr: Handle) -> usize {
        match self.get(arr) {
            Obj::Array(v) => v.len(),
            _ => 1,
        }
    }

    pub fn array_index_of(&self, arr: Handle, needle: Handle) -> Option<usize> {
        self.array_items(arr)
            .iter()
            .position(|h| self.structural_eq(*h, needle))
    }

    pub fn array_del(&mut self, arr: Handle, idx: usize) {
        if let Obj::Array(v) = self.get_mut(arr) {
            if idx < v.len() {
                v.remove(idx);
            }
        }
    }

    /// Recursively splice nested arrays; non-array items pass through.
    /// `flatten(flatten(a)) == flatten(a)` (idempotent, `spec.md` §8 invariant 5).
    pub fn flatten(&self, arr: Handle) -> Vec<Handle> {
        let mut out = Vec::new();
        self.flatten_into(arr, &mut out);
        out
    }

    fn flatten_into(&self, h: Handle, out: &mut Vec<Handle>) {
        match self.get(h) {
            Obj::Array(items) => {
                for item in items.clone() {
                    self.flatten_into(item, out);
                }
            }
            _ => out.push(h),
        }
    }

    /// Reduce a one-element nested array to its sole element; otherwise
    /// return the handle unchanged.
    pub fn flatten_one(&self, h: Handle) -> Handle {
        match self.get(h) {
            Obj::Array(items) if items.len() == 1 => items[0],
            _ => h,
        }
    }

    /// Iterate an array with snapshot semantics: the length is captured at
    /// call time, so pushes performed by `f` do not extend this iteration
    /// and deletes do not panic (`spec.md` §9 Open Questions — this
    /// implementation picks snapshot semantics).
    pub fn array_foreach<E>(
        &self,
        arr: Handle,
        mut f: impl FnMut(Handle) -> Result<(), E>,
    ) -> Result<(), E> {
        let snapshot = self.array_items(arr);
        for item in snapshot {
            f(item)?;
        }
        Ok(())
    }

    // ---- dict operations ----

    pub fn dict_set(&mut self, dict: Handle, key: String, val: Handle) {
        if let Obj::Dict(m) = self.get_mut(dict) {
            m.insert(key, val);
        }
    }

    pub fn dict_get(&self, dict: Handle, key: &str) -> Option<Handle> {
        match self.get(dict) {
            Obj::Dict(m) => m.get(key).copied(),
            _ => None,
        }
    }

    pub fn dict_has(&self, dict: Handle, key: &str) -> bool {
        match self.get(dict) {
            Obj::Dict(m) => m.contains_key(key),
            _ => false,
        }
    }

    pub fn dict_keys(&self, dict: Handle) -> Vec<String> {
        match self.get(dict) {
            Obj::Dict(m) => m.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Insertion-ordered iteration (`spec.md` §3.1 "dict" invariant).
    pub fn dict_foreach<E>(
        &self,
        dict: Handle,
        mut f: impl FnMut(&str, Handle) -> Result<(), E>,
    ) -> Result<(), E> {
        let snapshot: Vec<(String, Handle)> = match self.get(dict) {
            Obj::Dict(m) => m.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            _ => Vec::new(),
        };
        for (k, v) in snapshot {
            f(&k, v)?;
        }
        Ok(())
    }

    /// Later keys win (`spec.md` §4.6 "`+` on ... dict is ... merge").
    pub fn dict_merge(&mut self, into: Handle, other: Handle) {
        let items: Vec<(String, Handle)> = match self.get(other) {
            Obj::Dict(m) => m.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            _ => Vec::new(),
        };
        for (k, v) in items {
            self.dict_set(into, k, v);
        }
    }

    // ---- equality ----

    /// Structural equality for strings/numbers/bools; handle-equality
    /// otherwise (`spec.md` §4.6 "Operators").
    pub fn structural_eq(&self, a: Handle, b: Handle) -> bool {
        match (self.get(a), self.get(b)) {
            (Obj::Null, Obj::Null) => true,
            (Obj::Bool(x), Obj::Bool(y)) => x == y,
            (Obj::Number(x), Obj::Number(y)) => x == y,
            (Obj::Str(x), Obj::Str(y)) | (Obj::File(x), Obj::File(y)) => {
                self.strings.get(*x) == self.strings.get(*y)
            }
            _ => a == b,
        }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_zero_is_null() {
        let arena = Arena::new();
        assert!(matches!(arena.get(0), Obj::Null));
    }

    #[test]
    fn string_pool_roundtrip_is_stable() {
        let mut arena = Arena::new();
        let h = arena.make_string("hello");
        assert_eq!(arena.display(h), "hello");
    }

    #[test]
    fn flatten_is_idempotent() {
        let mut arena = Arena::new();
        let a = arena.make_int(1);
        let b = arena.make_int(2);
        let inner = arena.make_array(vec![a, b]);
        let outer = arena.make_array(vec![inner, a]);
        let once: Vec<Handle> = arena.flatten(outer);
        let flat_arr = arena.make_array(once.clone());
        let twice = arena.flatten(flat_arr);
        assert_eq!(once, twice);
    }

    #[test]
    fn flatten_one_reduces_singleton() {
        let mut arena = Arena::new();
        let a = arena.make_int(1);
        let wrapped = arena.make_array(vec![a]);
        assert_eq!(arena.flatten_one(wrapped), a);
        let not_singleton = arena.make_array(vec![a, a]);
        assert_eq!(arena.flatten_one(not_singleton), not_singleton);
    }

    #[test]
    fn dict_iterates_in_insertion_order() {
        let mut arena = Arena::new();
        let dict = arena.make_dict();
        let v1 = arena.make_int(1);
        let v2 = arena.make_int(2);
        arena.dict_set(dict, "b".to_string(), v1);
        arena.dict_set(dict, "a".to_string(), v2);
        assert_eq!(arena.dict_keys(dict), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn array_foreach_sees_snapshot() {
        let mut arena = Arena::new();
        let a = arena.make_int(1);
        let arr = arena.make_array(vec![a]);
        let mut count = 0;
        let push_target = arr;
        arena
            .array_foreach(arr, |_h| -> Result<(), ()> {
                count += 1;
                Ok(())
            })
            .unwrap();
        // mutate after the snapshot was taken for the loop above
        arena.array_push(push_target, a);
        assert_eq!(count, 1);
        assert_eq!(arena.array_len(push_target), 2);
    }
}
