//! Site-level genotype symbols and fixed-length haplotype strings.
//!

use crate::utils::Result;
use itertools::Itertools;
use std::{fmt, str::FromStr};

/// Genotype symbol observed at one differentiating site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Allele {
    /// Gene (reference) base, written `1`.
    Reference,
    /// Pseudogene-like (variant) base, written `2`.
    Variant,
    /// Site not covered or not called, written `x`.
    Unknown,
}

impl Allele {
    pub fn from_symbol(symbol: char) -> Result<Self> {
        match symbol {
            '1' => Ok(Allele::Reference),
            '2' => Ok(Allele::Variant),
            'x' | 'X' => Ok(Allele::Unknown),
            _ => Err(format!("Invalid genotype symbol '{}'", symbol)),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Allele::Reference => '1',
            Allele::Variant => '2',
            Allele::Unknown => 'x',
        }
    }

    pub fn is_resolved(self) -> bool {
        self != Allele::Unknown
    }
}

/// Allele switch between two adjacent sites of a haplotype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// `12`: reference followed by variant.
    RefToVar,
    /// `21`: variant followed by reference.
    VarToRef,
}

impl Transition {
    pub const ALL: [Transition; 2] = [Transition::RefToVar, Transition::VarToRef];

    pub fn pattern(self) -> [Allele; 2] {
        match self {
            Transition::RefToVar => [Allele::Reference, Allele::Variant],
            Transition::VarToRef => [Allele::Variant, Allele::Reference],
        }
    }

    /// Offset of the reference allele within the two-site pattern.
    pub fn reference_offset(self) -> usize {
        match self {
            Transition::RefToVar => 0,
            Transition::VarToRef => 1,
        }
    }
}

/// Ordered sequence of alleles, one per site of the region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Haplotype(Vec<Allele>);

impl Haplotype {
    pub fn new(alleles: Vec<Allele>) -> Self {
        Haplotype(alleles)
    }

    pub fn unknown(len: usize) -> Self {
        Haplotype(vec![Allele::Unknown; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn alleles(&self) -> &[Allele] {
        &self.0
    }

    pub fn get(&self, pos: usize) -> Allele {
        self.0.get(pos).copied().unwrap_or(Allele::Unknown)
    }

    pub fn set(&mut self, pos: usize, allele: Allele) {
        self.0[pos] = allele;
    }

    pub fn is_resolved_at(&self, pos: usize) -> bool {
        self.get(pos).is_resolved()
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.0.iter().all(|a| a.is_resolved())
    }

    pub fn has_unknown(&self) -> bool {
        !self.is_fully_resolved()
    }

    pub fn resolved_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_resolved())
            .map(|(i, _)| i)
    }

    pub fn first_resolved(&self) -> Option<usize> {
        self.0.iter().position(|a| a.is_resolved())
    }

    pub fn last_resolved(&self) -> Option<usize> {
        self.0.iter().rposition(|a| a.is_resolved())
    }

    /// True when the two haplotypes agree at every position resolved in both.
    pub fn is_consistent_with(&self, other: &Haplotype) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| !a.is_resolved() || !b.is_resolved() || a == b)
    }

    /// True when some position is resolved in both haplotypes.
    pub fn overlaps(&self, other: &Haplotype) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .any(|(a, b)| a.is_resolved() && b.is_resolved())
    }

    /// Like [`Haplotype::overlaps`] but only counting positions in `start..end`.
    pub fn overlaps_within(&self, other: &Haplotype, start: usize, end: usize) -> bool {
        (start..end.min(self.len())).any(|i| self.is_resolved_at(i) && other.is_resolved_at(i))
    }

    /// Alleles at the requested positions, `None` unless all are resolved.
    pub fn project(&self, positions: &[usize]) -> Option<Vec<Allele>> {
        let alleles = positions.iter().map(|&p| self.get(p)).collect_vec();
        if alleles.iter().all(|a| a.is_resolved()) {
            Some(alleles)
        } else {
            None
        }
    }

    /// Alleles at the requested positions, keeping unknowns.
    pub fn restrict(&self, positions: &[usize]) -> Haplotype {
        Haplotype(positions.iter().map(|&p| self.get(p)).collect())
    }

    /// Union of resolved positions; callers check consistency first.
    pub fn merge(&self, other: &Haplotype) -> Haplotype {
        Haplotype(
            self.0
                .iter()
                .zip(other.0.iter())
                .map(|(&a, &b)| if a.is_resolved() { a } else { b })
                .collect(),
        )
    }

    fn transition_positions(&self, transition: Transition) -> impl Iterator<Item = usize> + '_ {
        let pattern = transition.pattern();
        self.0
            .windows(2)
            .enumerate()
            .filter(move |(_, w)| w[..] == pattern[..])
            .map(|(i, _)| i)
    }

    pub fn count_transition(&self, transition: Transition) -> usize {
        self.transition_positions(transition).count()
    }

    pub fn has_transition(&self, transition: Transition) -> bool {
        self.first_transition(transition).is_some()
    }

    /// Position of the first site of the first switch of this kind.
    pub fn first_transition(&self, transition: Transition) -> Option<usize> {
        self.transition_positions(transition).next()
    }

    /// Exactly one switch in one direction and none in the other.
    pub fn has_single_switch(&self, transition: Transition) -> bool {
        let reverse = match transition {
            Transition::RefToVar => Transition::VarToRef,
            Transition::VarToRef => Transition::RefToVar,
        };
        self.count_transition(transition) == 1 && !self.has_transition(reverse)
    }
}

impl FromStr for Haplotype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self> {
        let alleles = s
            .trim()
            .chars()
            .map(Allele::from_symbol)
            .collect::<Result<Vec<_>>>()
            .map_err(|e| format!("Invalid haplotype '{}': {}", s, e))?;
        Ok(Haplotype(alleles))
    }
}

impl fmt::Display for Haplotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for allele in &self.0 {
            write!(f, "{}", allele.symbol())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hap(s: &str) -> Haplotype {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_display_round_trip_symbols() {
        let h = hap("12xx21");
        assert_eq!(h.len(), 6);
        assert_eq!(h.get(0), Allele::Reference);
        assert_eq!(h.get(1), Allele::Variant);
        assert_eq!(h.get(2), Allele::Unknown);
        assert_eq!(h.to_string(), "12xx21");
    }

    #[test]
    fn parse_rejects_unknown_symbols() {
        assert!("1213".parse::<Haplotype>().is_err());
        assert!("1A".parse::<Haplotype>().is_err());
    }

    #[test]
    fn consistency_ignores_unknown_positions() {
        assert!(hap("11xx").is_consistent_with(&hap("x121")));
        assert!(!hap("112x").is_consistent_with(&hap("x11x")));
        assert!(hap("xxxx").is_consistent_with(&hap("2222")));
    }

    #[test]
    fn overlap_requires_shared_resolved_position() {
        assert!(!hap("11xx").overlaps(&hap("xx11")));
        assert!(hap("111x").overlaps(&hap("xx11")));
        assert!(!hap("111x").overlaps_within(&hap("xx11"), 0, 2));
    }

    #[test]
    fn transitions_follow_adjacent_substring_semantics() {
        let h = hap("1111121111");
        assert_eq!(h.count_transition(Transition::RefToVar), 1);
        assert_eq!(h.count_transition(Transition::VarToRef), 1);
        assert_eq!(h.first_transition(Transition::RefToVar), Some(4));
        assert_eq!(h.first_transition(Transition::VarToRef), Some(5));

        let h = hap("1x2");
        assert!(!h.has_transition(Transition::RefToVar));

        let h = hap("2221111");
        assert!(h.has_single_switch(Transition::VarToRef));
        assert!(!h.has_single_switch(Transition::RefToVar));
    }

    #[test]
    fn merge_fills_unknown_positions() {
        assert_eq!(hap("11xx").merge(&hap("x122")).to_string(), "1122");
    }

    #[test]
    fn project_requires_all_positions_resolved() {
        let h = hap("x12x");
        assert_eq!(
            h.project(&[1, 2]),
            Some(vec![Allele::Reference, Allele::Variant])
        );
        assert_eq!(h.project(&[0, 1]), None);
        assert_eq!(h.restrict(&[0, 1]).to_string(), "x1");
    }
}
