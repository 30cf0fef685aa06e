//! Temporal consensus over the values a parser read in consecutive frames.

use std::collections::{HashMap, VecDeque};

/// Keeps the last few readings of one field and votes on them.
///
/// Readings of the most common length vote per character position. Ties are
/// won by the most recent reading.
#[derive(Debug, Clone)]
pub struct Sieve {
    window: usize,
    history: VecDeque<Vec<char>>,
}

impl Sieve {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            history: VecDeque::with_capacity(window),
        }
    }

    /// Add a reading and return the current consensus.
    pub fn push(&mut self, value: &str) -> String {
        if self.history.len() == self.window {
            self.history.pop_front();
        }
        self.history.push_back(value.chars().collect());
        self.consensus().unwrap_or_default()
    }

    /// Consensus of the readings kept so far.
    pub fn consensus(&self) -> Option<String> {
        let length = self.majority_length()?;

        let readings: Vec<&Vec<char>> = self
            .history
            .iter()
            .rev()
            .filter(|r| r.len() == length)
            .collect();

        let value = (0..length)
            .map(|position| {
                let mut counts: Vec<(char, usize)> = Vec::new();
                for reading in &readings {
                    let c = reading[position];
                    match counts.iter_mut().find(|(seen, _)| *seen == c) {
                        Some((_, count)) => *count += 1,
                        None => counts.push((c, 1)),
                    }
                }
                // Newest first, so the first maximum is the most recent one.
                counts
                    .iter()
                    .fold((' ', 0), |best, &(c, count)| if count > best.1 { (c, count) } else { best })
                    .0
            })
            .collect();

        Some(value)
    }

    fn majority_length(&self) -> Option<usize> {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for reading in &self.history {
            *counts.entry(reading.len()).or_default() += 1;
        }

        let mut best: Option<(usize, usize)> = None;
        for reading in self.history.iter().rev() {
            let count = counts[&reading.len()];
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((reading.len(), count));
            }
        }
        best.map(|(length, _)| length)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_reading_passes_through() {
        let mut sieve = Sieve::new(5);
        assert_eq!(sieve.push("123456789"), "123456789");
    }

    #[test]
    fn test_majority_per_position() {
        let mut sieve = Sieve::new(5);
        sieve.push("123456789");
        sieve.push("1Z3456789");
        assert_eq!(sieve.push("123456780"), "123456789");
    }

    #[test]
    fn test_tie_goes_to_latest() {
        let mut sieve = Sieve::new(5);
        sieve.push("ABC");
        assert_eq!(sieve.push("ABD"), "ABD");
    }

    #[test]
    fn test_length_majority() {
        let mut sieve = Sieve::new(5);
        sieve.push("ZAGREB");
        sieve.push("ZAGRE8");
        sieve.push("ZAGREBB");
        assert_eq!(sieve.consensus().unwrap(), "ZAGRE8");
        assert_eq!(sieve.push("ZAGREB"), "ZAGREB");
    }

    #[test]
    fn test_window_drops_old_readings() {
        let mut sieve = Sieve::new(2);
        sieve.push("AAA");
        sieve.push("AAA");
        sieve.push("BBB");
        assert_eq!(sieve.len(), 2);
        assert_eq!(sieve.push("BBB"), "BBB");
    }
}
