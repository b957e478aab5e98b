//! Military rank catalog.
//!
//! The catalog is ordered by hierarchy, lowest first. Rank codes are the
//! values written to the spreadsheet; labels are what the form shows.

use std::fmt;

/// Hierarchy bucket a rank belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankCategory {
    Enlisted,
    Nco,
    Officer,
    SeniorOfficer,
}

impl RankCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enlisted => "enlisted",
            Self::Nco => "nco",
            Self::Officer => "officer",
            Self::SeniorOfficer => "senior_officer",
        }
    }
}

impl fmt::Display for RankCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the rank catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankDefinition {
    pub code: &'static str,
    pub label: &'static str,
    pub category: RankCategory,
}

/// All recognised ranks in order of hierarchy.
pub const RANK_CATALOG: &[RankDefinition] = &[
    RankDefinition {
        code: "SD",
        label: "Soldado (SD)",
        category: RankCategory::Enlisted,
    },
    RankDefinition {
        code: "CB",
        label: "Cabo (CB)",
        category: RankCategory::Enlisted,
    },
    RankDefinition {
        code: "SGT",
        label: "Sargento (SGT)",
        category: RankCategory::Nco,
    },
    RankDefinition {
        code: "SUB TEN",
        label: "Subtenente (SUB TEN)",
        category: RankCategory::Nco,
    },
    RankDefinition {
        code: "TEN",
        label: "Tenente (TEN)",
        category: RankCategory::Officer,
    },
    RankDefinition {
        code: "CAP",
        label: "Capitão (CAP)",
        category: RankCategory::Officer,
    },
    RankDefinition {
        code: "MAJ",
        label: "Major (MAJ)",
        category: RankCategory::Officer,
    },
    RankDefinition {
        code: "TEN CEL",
        label: "Tenente Coronel (TEN CEL)",
        category: RankCategory::SeniorOfficer,
    },
    RankDefinition {
        code: "CEL",
        label: "Coronel (CEL)",
        category: RankCategory::SeniorOfficer,
    },
];

/// Look up a rank by its exact code.
pub fn find_rank(code: &str) -> Option<&'static RankDefinition> {
    RANK_CATALOG.iter().find(|rank| rank.code == code)
}

pub fn is_known_rank(code: &str) -> bool {
    find_rank(code).is_some()
}

/// Display label for a rank code, or the code itself when it is not in
/// the catalog.
pub fn format_rank(code: &str) -> &str {
    find_rank(code).map_or(code, |rank| rank.label)
}
