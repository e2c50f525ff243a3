use crate::rng::RandomSource;
use crate::tables::parse::content_lines;

const DEFAULT_FIRST: &str = "Alex";
const DEFAULT_LAST: &str = "Johnson";

/// First and last name lists. Neither list is ever empty.
#[derive(Debug, Clone)]
pub struct NamePool {
    first: Vec<String>,
    last: Vec<String>,
}

impl Default for NamePool {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl NamePool {
    pub fn new(mut first: Vec<String>, mut last: Vec<String>) -> Self {
        if first.is_empty() {
            first.push(DEFAULT_FIRST.to_string());
        }
        if last.is_empty() {
            last.push(DEFAULT_LAST.to_string());
        }
        Self { first, last }
    }

    /// One name per line.
    pub fn parse_list(content: &str) -> Vec<String> {
        content_lines(content, &['#'])
            .map(|(_, line)| line.to_string())
            .collect()
    }

    /// Two independent draws joined by a space.
    pub fn full_name(&self, rng: &mut dyn RandomSource) -> String {
        let first = rng
            .pick_index(self.first.len())
            .and_then(|idx| self.first.get(idx))
            .map_or(DEFAULT_FIRST, String::as_str);
        let last = rng
            .pick_index(self.last.len())
            .and_then(|idx| self.last.get(idx))
            .map_or(DEFAULT_LAST, String::as_str);
        format!("{} {}", first, last)
    }

    pub fn first_count(&self) -> usize {
        self.first.len()
    }

    pub fn last_count(&self) -> usize {
        self.last.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::EngineRng;

    #[test]
    fn empty_lists_fall_back_to_defaults() {
        let pool = NamePool::default();
        let mut rng = EngineRng::from_seed(4);
        assert_eq!(pool.full_name(&mut rng), "Alex Johnson");
    }

    #[test]
    fn names_come_from_both_lists() {
        let first = NamePool::parse_list("# first\nKira\n\nDax\n");
        assert_eq!(first, vec!["Kira", "Dax"]);
        let pool = NamePool::new(first, vec!["Vance".to_string()]);
        let mut rng = EngineRng::from_seed(11);
        for _ in 0..20 {
            let name = pool.full_name(&mut rng);
            assert!(name == "Kira Vance" || name == "Dax Vance", "{}", name);
        }
    }
}
