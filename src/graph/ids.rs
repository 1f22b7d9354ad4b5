use ahash::AHashMap;

/// Hands out node ids derived from a base id (usually the plugin id).
///
/// The first id for a base is the bare base, following ones get a `_2`, `_3`, ...
/// suffix. Counters are per model, so two editing sessions never share state.
#[derive(Debug, Clone, Default)]
pub struct NodeIdGenerator {
    counters: AHashMap<String, u32>,
}

impl NodeIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the counters from a set of existing node ids.
    ///
    /// `base_N` raises the counter of `base` to at least `N`; an id without a
    /// numeric suffix marks its bare form as used.
    pub fn seed<'a>(&mut self, node_ids: impl IntoIterator<Item = &'a str>) {
        self.counters.clear();
        for id in node_ids {
            match split_numeric_suffix(id) {
                Some((base, suffix)) => {
                    let current = self.counters.entry(base.to_string()).or_insert(0);
                    if suffix > *current {
                        *current = suffix;
                    }
                }
                None => {
                    self.counters.entry(id.to_string()).or_insert(1);
                }
            }
        }
    }

    /// Returns an unused id for `base_id`.
    pub fn fresh(&mut self, base_id: &str) -> String {
        match self.counters.get_mut(base_id) {
            Some(count) => {
                *count += 1;
                format!("{}_{}", base_id, count)
            }
            None => {
                self.counters.insert(base_id.to_string(), 1);
                base_id.to_string()
            }
        }
    }
}

fn split_numeric_suffix(id: &str) -> Option<(&str, u32)> {
    let separator = id.rfind('_')?;
    if separator == 0 {
        return None;
    }
    let suffix = id[separator + 1..].parse().ok()?;
    Some((&id[..separator], suffix))
}

/// Sequential edge ids. Edge ids carry no meaning beyond uniqueness in a session.
#[derive(Debug, Clone, Default)]
pub struct EdgeIdGenerator {
    counter: u64,
}

impl EdgeIdGenerator {
    pub fn next_id(&mut self) -> String {
        self.counter += 1;
        self.counter.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_id_is_bare_then_suffixed() {
        let mut ids = NodeIdGenerator::new();
        assert_eq!(ids.fresh("levenshtein"), "levenshtein");
        assert_eq!(ids.fresh("levenshtein"), "levenshtein_2");
        assert_eq!(ids.fresh("levenshtein"), "levenshtein_3");
        assert_eq!(ids.fresh("lowerCase"), "lowerCase");
    }

    #[test]
    fn seeding_respects_existing_suffixes() {
        let mut ids = NodeIdGenerator::new();
        ids.seed(["sourcePathInput", "lowerCase_4", "_7"]);
        assert_eq!(ids.fresh("sourcePathInput"), "sourcePathInput_2");
        assert_eq!(ids.fresh("lowerCase"), "lowerCase_5");
        assert_eq!(ids.fresh("_7"), "_7_2");
    }
}
