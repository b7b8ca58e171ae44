//! Team randomizer
//!
//! Splits a comma-separated list of names into two shuffled teams. With an
//! odd count team A gets the extra player.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teams {
    pub a: Vec<String>,
    pub b: Vec<String>,
}

/// Names from a comma-separated list, trimmed, blanks dropped.
pub fn parse_names(input: &str) -> Vec<String> {
    input.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// `None` when the input holds no names.
pub fn randomize<R: Rng + ?Sized>(input: &str, rng: &mut R) -> Option<Teams> {
    let mut names = parse_names(input);
    if names.is_empty() {
        return None;
    }

    names.shuffle(rng);
    let midpoint = names.len().div_ceil(2);
    let b = names.split_off(midpoint);
    Some(Teams { a: names, b })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_parse_names() {
        assert_eq!(parse_names(" Ana, Beto ,,  ,Caro"), vec!["Ana", "Beto", "Caro"]);
        assert!(parse_names(" , ").is_empty());
    }

    #[test]
    fn test_empty_input_yields_none() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(randomize("", &mut rng), None);
        assert_eq!(randomize(" ,, ", &mut rng), None);
    }

    #[test]
    fn test_odd_count_gives_team_a_extra() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let teams = randomize("a,b,c,d,e", &mut rng).unwrap();
        assert_eq!(teams.a.len(), 3);
        assert_eq!(teams.b.len(), 2);

        let mut all: Vec<String> = teams.a.iter().chain(&teams.b).cloned().collect();
        all.sort();
        assert_eq!(all, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_single_name() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let teams = randomize("Solo", &mut rng).unwrap();
        assert_eq!(teams.a, vec!["Solo"]);
        assert!(teams.b.is_empty());
    }
}
