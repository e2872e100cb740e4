//! Branching scenarios for the simulator.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// MW-001: spin superposition, refused re-measurement, charge in a branch
    Spin,

    /// MW-002: seeded random superpositions measured level by level
    Cascade,

    /// MW-003: definite states never split
    Definite,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![ScenarioId::Spin, ScenarioId::Cascade, ScenarioId::Definite]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Spin => "spin",
            ScenarioId::Cascade => "cascade",
            ScenarioId::Definite => "definite",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Spin => "Measure spin_z on |up>+|down>, retry it, then measure charge in the first branch",
            ScenarioId::Cascade => "Random superpositions from the seed, every leaf measured at each level",
            ScenarioId::Definite => "Definite states produce single-branch measurements only",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spin" | "demo" | "mw-001" => Ok(ScenarioId::Spin),
            "cascade" | "mw-002" => Ok(ScenarioId::Cascade),
            "definite" | "mw-003" => Ok(ScenarioId::Definite),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_parse_back() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
        }
    }

    #[test]
    fn test_aliases_and_unknown() {
        assert_eq!("DEMO".parse::<ScenarioId>(), Ok(ScenarioId::Spin));
        assert_eq!("mw-002".parse::<ScenarioId>(), Ok(ScenarioId::Cascade));
        assert!("entangle".parse::<ScenarioId>().is_err());
    }
}
