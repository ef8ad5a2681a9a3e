//! Per-category analysis thresholds.
//!
//! Outlier sensitivity and budget-share warnings differ by spending
//! category: housing is dominated by one large recurring bill, leisure is
//! bursty. The table is fixed at compile time with a mandatory default
//! entry for unknown labels.

/// Analysis thresholds for one category.
#[derive(Debug, Clone, Copy)]
pub struct CategoryProfile {
    /// Multiplier on the MAD-based dispersion when flagging outliers (>= 1).
    pub outlier_factor: f64,
    /// Share of total spend above which the category triggers a budget
    /// warning, in (0, 1).
    pub budget_warn_fraction: f64,
}

const DEFAULT_PROFILE: CategoryProfile = CategoryProfile {
    outlier_factor: 2.5,
    budget_warn_fraction: 0.15,
};

const PROFILES: &[(&str, CategoryProfile)] = &[
    (
        "Alimentação",
        CategoryProfile {
            outlier_factor: 2.0,
            budget_warn_fraction: 0.30,
        },
    ),
    (
        "Transporte",
        CategoryProfile {
            outlier_factor: 2.5,
            budget_warn_fraction: 0.20,
        },
    ),
    (
        "Lazer",
        CategoryProfile {
            outlier_factor: 3.0,
            budget_warn_fraction: 0.15,
        },
    ),
    (
        "Saúde",
        CategoryProfile {
            outlier_factor: 3.5,
            budget_warn_fraction: 0.10,
        },
    ),
    (
        "Educação",
        CategoryProfile {
            outlier_factor: 2.0,
            budget_warn_fraction: 0.15,
        },
    ),
    (
        "Moradia",
        CategoryProfile {
            outlier_factor: 1.5,
            budget_warn_fraction: 0.40,
        },
    ),
    (
        "Investimentos",
        CategoryProfile {
            outlier_factor: 2.0,
            budget_warn_fraction: 0.20,
        },
    ),
    (
        "Vestuário",
        CategoryProfile {
            outlier_factor: 2.5,
            budget_warn_fraction: 0.10,
        },
    ),
    (
        "Eletrônicos",
        CategoryProfile {
            outlier_factor: 3.0,
            budget_warn_fraction: 0.05,
        },
    ),
];

/// Profile for a category label, falling back to the default entry.
pub fn profile_for(category: &str) -> CategoryProfile {
    PROFILES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, p)| *p)
        .unwrap_or(DEFAULT_PROFILE)
}
