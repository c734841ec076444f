//! Deterministic unique-name allocation.
//!
//! Every synthesized routine and local temporary gets a name unique
//! within its scope; collisions are resolved by appending an
//! incrementing numeric suffix. Loop counters draw from a small
//! reserved pool of short names first and fall back to the same suffix
//! mechanism once the pool is exhausted. Given identical inputs, two
//! runs allocate identical names, which keeps generated output
//! byte-for-byte diffable.

use rustc_hash::FxHashSet;

/// Reserved short names handed out for loop counters, in order.
const INDEX_POOL: [&str; 5] = ["i", "j", "k", "l", "m"];

/// A per-scope name allocator.
///
/// One instance covers one scope: routine names at the generator level,
/// locals within one routine body. Seeding parameter names with
/// [`claim`](Namer::claim) keeps temporaries from shadowing them.
#[derive(Debug, Default, Clone)]
pub struct Namer {
    taken: FxHashSet<String>,
}

impl Namer {
    pub fn new() -> Self {
        Namer::default()
    }

    /// Mark a name as taken without allocating it (used for parameters
    /// and other caller-chosen names). Returns false if already taken.
    pub fn claim(&mut self, name: impl Into<String>) -> bool {
        self.taken.insert(name.into())
    }

    /// Allocate a unique name from `base`: `base` itself if free,
    /// otherwise `base2`, `base3`, ...
    pub fn unique(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n: u32 = 2;
        loop {
            let candidate = format!("{base}{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Allocate a loop-counter name from the reserved pool, falling
    /// back to numeric suffixing of `i` once the pool is used up.
    pub fn index_var(&mut self) -> String {
        for candidate in INDEX_POOL {
            if self.taken.insert(candidate.to_string()) {
                return candidate.to_string();
            }
        }
        self.unique("i")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_use_returns_base() {
        let mut namer = Namer::new();
        assert_eq!(namer.unique("out"), "out");
    }

    #[test]
    fn collisions_get_numeric_suffixes() {
        let mut namer = Namer::new();
        assert_eq!(namer.unique("out"), "out");
        assert_eq!(namer.unique("out"), "out2");
        assert_eq!(namer.unique("out"), "out3");
    }

    #[test]
    fn claimed_names_are_avoided() {
        let mut namer = Namer::new();
        assert!(namer.claim("source"));
        assert!(!namer.claim("source"));
        assert_eq!(namer.unique("source"), "source2");
    }

    #[test]
    fn index_pool_in_order_then_renumbered() {
        let mut namer = Namer::new();
        let got: Vec<String> = (0..7).map(|_| namer.index_var()).collect();
        assert_eq!(got, ["i", "j", "k", "l", "m", "i2", "i3"]);
    }

    #[test]
    fn index_pool_skips_claimed_entries() {
        let mut namer = Namer::new();
        namer.claim("i");
        namer.claim("j");
        assert_eq!(namer.index_var(), "k");
    }

    #[test]
    fn deterministic_across_runs() {
        let run = || {
            let mut namer = Namer::new();
            namer.claim("source");
            vec![
                namer.unique("out"),
                namer.unique("out"),
                namer.index_var(),
                namer.unique("tmp"),
            ]
        };
        assert_eq!(run(), run());
    }
}
