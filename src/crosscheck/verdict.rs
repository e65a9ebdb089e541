//! Consistency verdicts between static labels and runtime counts.

use crate::parser::schema::Prr;
use std::fmt;

/// Outcome of comparing a site's static label with its instrumented counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// `defef`, and only EF entries were observed
    EfOnly,
    /// `defdac`, and only DAC entries were observed
    DacOnly,
    /// `defef`, but DAC entries were observed
    EfOnlyViolated,
    /// `defdac`, but EF entries were observed
    DacOnlyViolated,
    /// `both`, but only DAC entries were observed
    OverconservativeDac,
    /// `both`, but only EF entries were observed
    OverconservativeEf,
    /// `both`, and both kinds of entries were observed
    AccurateBoth,
    /// `both`, and the site never ran
    Unexercised,
    /// `untouched` by the analysis
    Untouched,
}

/// Which instrumented caller lists back up a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evidence {
    None,
    Ef,
    Dac,
    EfAndDac,
}

impl Verdict {
    pub fn classify(prr: Prr, ef: u64, dac: u64) -> Self {
        match prr {
            Prr::Defef if dac > 0 => Verdict::EfOnlyViolated,
            Prr::Defef => Verdict::EfOnly,
            Prr::Defdac if ef > 0 => Verdict::DacOnlyViolated,
            Prr::Defdac => Verdict::DacOnly,
            Prr::Both => match (ef > 0, dac > 0) {
                (false, true) => Verdict::OverconservativeDac,
                (true, false) => Verdict::OverconservativeEf,
                (true, true) => Verdict::AccurateBoth,
                (false, false) => Verdict::Unexercised,
            },
            Prr::Untouched => Verdict::Untouched,
        }
    }

    /// The static label contradicts the runtime counts
    pub fn is_violation(&self) -> bool {
        matches!(self, Verdict::EfOnlyViolated | Verdict::DacOnlyViolated)
    }

    /// Worth reporting with call-path provenance
    pub fn is_notable(&self) -> bool {
        !matches!(
            self,
            Verdict::EfOnly | Verdict::DacOnly | Verdict::Unexercised | Verdict::Untouched
        )
    }

    pub fn evidence(&self) -> Evidence {
        match self {
            Verdict::EfOnlyViolated | Verdict::OverconservativeDac => Evidence::Dac,
            Verdict::DacOnlyViolated | Verdict::OverconservativeEf => Evidence::Ef,
            Verdict::AccurateBoth => Evidence::EfAndDac,
            _ => Evidence::None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::EfOnly => "ef-only",
            Verdict::DacOnly => "dac-only",
            Verdict::EfOnlyViolated => "violated-ef",
            Verdict::DacOnlyViolated => "violated-dac",
            Verdict::OverconservativeDac => "overconservative-dac",
            Verdict::OverconservativeEf => "overconservative-ef",
            Verdict::AccurateBoth => "accurate both",
            Verdict::Unexercised => "unexercised",
            Verdict::Untouched => "untouched",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_strategy_labels() {
        assert_eq!(Verdict::classify(Prr::Defef, 5, 0), Verdict::EfOnly);
        assert_eq!(Verdict::classify(Prr::Defef, 5, 3), Verdict::EfOnlyViolated);
        assert_eq!(Verdict::classify(Prr::Defdac, 0, 9), Verdict::DacOnly);
        assert_eq!(Verdict::classify(Prr::Defdac, 1, 9), Verdict::DacOnlyViolated);
    }

    #[test]
    fn test_both_label() {
        assert_eq!(Verdict::classify(Prr::Both, 0, 2), Verdict::OverconservativeDac);
        assert_eq!(Verdict::classify(Prr::Both, 2, 0), Verdict::OverconservativeEf);
        assert_eq!(Verdict::classify(Prr::Both, 2, 2), Verdict::AccurateBoth);
        assert_eq!(Verdict::classify(Prr::Both, 0, 0), Verdict::Unexercised);
    }

    #[test]
    fn test_evidence() {
        assert_eq!(Verdict::EfOnlyViolated.evidence(), Evidence::Dac);
        assert_eq!(Verdict::AccurateBoth.evidence(), Evidence::EfAndDac);
        assert_eq!(Verdict::Untouched.evidence(), Evidence::None);
        assert!(Verdict::EfOnlyViolated.is_violation());
        assert!(!Verdict::OverconservativeEf.is_violation());
        assert!(Verdict::OverconservativeEf.is_notable());
    }
}
