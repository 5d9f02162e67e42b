//! Label catalog: the fixed ordered mapping from class index to condition
//! name, plus per-condition recommendations.
//!
//! Deployments run against exactly one catalog variant, selected by
//! configuration at process start and immutable afterwards. Three variants
//! exist in the wild, with different class counts; they are never mixed.

use std::str::FromStr;

/// Sentinel name for indices outside the configured catalog range.
pub const UNKNOWN_CONDITION: &str = "Unknown Condition";

/// Generic recommendations for any condition without a mapped list.
pub const GENERIC_RECOMMENDATIONS: &[&str] = &[
    "Consult a dermatologist for proper diagnosis",
    "Keep the affected area clean and dry",
    "Avoid scratching or irritating the area",
    "Monitor for any changes in the condition",
];

/// One diagnosable skin-lesion category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub index: usize,
    pub name: &'static str,
}

/// Named catalog variants observed across deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogVariant {
    /// HAM10000 dermatoscopic dataset, 7 classes.
    #[default]
    Ham10000,
    /// ISIC challenge taxonomy, 9 classes.
    Isic2019,
    /// DermNet-style clinical categories, 10 classes.
    DermNet10,
}

impl CatalogVariant {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ham10000 => "ham10000",
            Self::Isic2019 => "isic2019",
            Self::DermNet10 => "dermnet10",
        }
    }
}

impl FromStr for CatalogVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim() {
            "ham10000" | "ham" => Ok(Self::Ham10000),
            "isic2019" | "isic" => Ok(Self::Isic2019),
            "dermnet10" | "dermnet" => Ok(Self::DermNet10),
            other => Err(format!("unknown catalog variant '{other}'")),
        }
    }
}

/// Total, ordered mapping from a contiguous index range to condition names,
/// with per-condition recommendations. Read-only after construction.
pub struct LabelCatalog {
    variant: CatalogVariant,
    names: &'static [&'static str],
    recommendations: &'static [(&'static str, &'static [&'static str])],
}

impl LabelCatalog {
    pub fn new(variant: CatalogVariant) -> Self {
        let (names, recommendations) = match variant {
            CatalogVariant::Ham10000 => (HAM10000_NAMES, HAM10000_RECOMMENDATIONS),
            CatalogVariant::Isic2019 => (ISIC2019_NAMES, ISIC2019_RECOMMENDATIONS),
            CatalogVariant::DermNet10 => (DERMNET10_NAMES, DERMNET10_RECOMMENDATIONS),
        };
        Self {
            variant,
            names,
            recommendations,
        }
    }

    pub fn variant(&self) -> CatalogVariant {
        self.variant
    }

    /// Number of condition labels (the classifier's N).
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve a class index to its condition. Out-of-range indices get the
    /// "Unknown Condition" sentinel rather than a panic or error — protects
    /// against catalog/model size mismatches.
    pub fn resolve(&self, index: usize) -> Condition {
        Condition {
            index,
            name: self.names.get(index).copied().unwrap_or(UNKNOWN_CONDITION),
        }
    }

    /// Recommendations for a condition name, or the generic list when the
    /// name has no mapped entry (the mapping is not guaranteed total).
    pub fn recommendations_for(&self, name: &str) -> &'static [&'static str] {
        self.recommendations
            .iter()
            .find(|(condition, _)| *condition == name)
            .map(|(_, recs)| *recs)
            .unwrap_or(GENERIC_RECOMMENDATIONS)
    }
}

// ── HAM10000 (7 classes) ──────────────────────────────────

const HAM10000_NAMES: &[&str] = &[
    "Actinic Keratoses",
    "Basal Cell Carcinoma",
    "Benign Keratosis",
    "Dermatofibroma",
    "Melanoma",
    "Melanocytic Nevi",
    "Vascular Lesions",
];

const HAM10000_RECOMMENDATIONS: &[(&str, &[&str])] = &[
    (
        "Actinic Keratoses",
        &["Use sunscreen", "Consider cryotherapy", "Regular skin checks"],
    ),
    (
        "Basal Cell Carcinoma",
        &[
            "Consult dermatologist immediately",
            "Schedule a biopsy",
            "Protect from sun exposure",
        ],
    ),
    (
        "Benign Keratosis",
        &[
            "Monitor for changes",
            "Use sunscreen",
            "Consult dermatologist if concerned",
        ],
    ),
    (
        "Dermatofibroma",
        &[
            "Monitor for changes",
            "Avoid irritation",
            "Consult dermatologist if concerned",
        ],
    ),
    (
        "Melanoma",
        &[
            "Seek immediate medical attention",
            "Schedule a biopsy",
            "Monitor for changes in size or color",
        ],
    ),
    (
        "Melanocytic Nevi",
        &[
            "Monitor for changes",
            "Avoid excessive sun exposure",
            "Regular skin checks",
        ],
    ),
    (
        "Vascular Lesions",
        &[
            "Consult dermatologist",
            "Protect from trauma",
            "Monitor for changes",
        ],
    ),
];

// ── ISIC 2019 (9 classes) ─────────────────────────────────

const ISIC2019_NAMES: &[&str] = &[
    "Melanoma",
    "Actinic Keratosis",
    "Basal Cell Carcinoma",
    "Dermatofibroma",
    "Nevus",
    "Pigmented Benign Keratosis",
    "Seborrheic Keratosis",
    "Squamous Cell Carcinoma",
    "Vascular Lesion",
];

const ISIC2019_RECOMMENDATIONS: &[(&str, &[&str])] = &[
    (
        "Melanoma",
        &[
            "Seek immediate medical attention",
            "Schedule a biopsy",
            "Monitor for changes in size or color",
        ],
    ),
    (
        "Actinic Keratosis",
        &[
            "Use sunscreen daily",
            "Consider cryotherapy or laser treatment",
            "Consult a dermatologist for evaluation",
        ],
    ),
    (
        "Basal Cell Carcinoma",
        &[
            "Consult a dermatologist immediately",
            "Schedule a biopsy",
            "Protect skin from UV exposure",
        ],
    ),
    (
        "Dermatofibroma",
        &[
            "Monitor for any changes",
            "Avoid unnecessary irritation",
            "Consult a doctor if it becomes painful",
        ],
    ),
    (
        "Nevus",
        &[
            "Monitor for asymmetry or color changes",
            "Avoid excessive sun exposure",
            "Get regular skin checks",
        ],
    ),
    (
        "Pigmented Benign Keratosis",
        &[
            "Use sunscreen",
            "Avoid scratching or picking",
            "Consult a dermatologist for removal if needed",
        ],
    ),
    (
        "Seborrheic Keratosis",
        &[
            "Monitor for unusual growth",
            "Avoid irritation",
            "Seek removal if it causes discomfort",
        ],
    ),
    (
        "Squamous Cell Carcinoma",
        &[
            "Seek medical attention immediately",
            "Consider Mohs surgery or radiation therapy",
            "Protect skin from excessive sun exposure",
        ],
    ),
    (
        "Vascular Lesion",
        &[
            "Monitor for changes",
            "Consider laser treatment for cosmetic concerns",
            "Consult a dermatologist if symptoms worsen",
        ],
    ),
];

// ── DermNet-style clinical categories (10 classes) ────────

const DERMNET10_NAMES: &[&str] = &[
    "Eczema",
    "Warts Molluscum and other Viral Infections",
    "Melanoma",
    "Atopic Dermatitis",
    "Basal Cell Carcinoma (BCC)",
    "Melanocytic Nevi (NV)",
    "Benign Keratosis-like Lesions (BKL)",
    "Psoriasis pictures Lichen Planus and related diseases",
    "Seborrheic Keratoses and other Benign Tumors",
    "Tinea Ringworm Candidiasis and other Fungal Infections",
];

const DERMNET10_RECOMMENDATIONS: &[(&str, &[&str])] = &[
    (
        "Eczema",
        &[
            "Apply moisturizing creams",
            "Avoid allergens",
            "Use topical steroids",
        ],
    ),
    (
        "Warts Molluscum and other Viral Infections",
        &[
            "Consider cryotherapy",
            "Keep area clean and dry",
            "Avoid touching or scratching",
        ],
    ),
    (
        "Melanoma",
        &[
            "Seek immediate medical attention",
            "Schedule a biopsy",
            "Monitor for changes in size or color",
        ],
    ),
    (
        "Atopic Dermatitis",
        &[
            "Use mild soaps and moisturizers",
            "Apply corticosteroid creams",
            "Identify and avoid triggers",
        ],
    ),
    (
        "Basal Cell Carcinoma (BCC)",
        &[
            "Consult dermatologist immediately",
            "Schedule a biopsy",
            "Protect from sun exposure",
        ],
    ),
    (
        "Melanocytic Nevi (NV)",
        &[
            "Monitor for changes",
            "Avoid excessive sun exposure",
            "Regular skin checks",
        ],
    ),
    (
        "Benign Keratosis-like Lesions (BKL)",
        &[
            "Monitor for changes",
            "Use sunscreen",
            "Consult dermatologist if concerned",
        ],
    ),
    (
        "Psoriasis pictures Lichen Planus and related diseases",
        &[
            "Use medicated creams",
            "Consider phototherapy",
            "Keep skin moisturized",
        ],
    ),
    (
        "Seborrheic Keratoses and other Benign Tumors",
        &[
            "Monitor for changes",
            "Avoid irritation",
            "Consult dermatologist if concerned",
        ],
    ),
    (
        "Tinea Ringworm Candidiasis and other Fungal Infections",
        &[
            "Apply antifungal creams",
            "Keep area clean and dry",
            "Complete full course of treatment",
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_class_counts() {
        assert_eq!(LabelCatalog::new(CatalogVariant::Ham10000).len(), 7);
        assert_eq!(LabelCatalog::new(CatalogVariant::Isic2019).len(), 9);
        assert_eq!(LabelCatalog::new(CatalogVariant::DermNet10).len(), 10);
    }

    #[test]
    fn resolve_valid_index() {
        let catalog = LabelCatalog::new(CatalogVariant::Ham10000);
        let condition = catalog.resolve(4);
        assert_eq!(condition.index, 4);
        assert_eq!(condition.name, "Melanoma");
    }

    #[test]
    fn resolve_out_of_range_is_unknown() {
        let catalog = LabelCatalog::new(CatalogVariant::Ham10000);
        assert_eq!(catalog.resolve(7).name, UNKNOWN_CONDITION);
        assert_eq!(catalog.resolve(usize::MAX).name, UNKNOWN_CONDITION);
    }

    #[test]
    fn every_index_resolves_to_a_unique_name() {
        for variant in [
            CatalogVariant::Ham10000,
            CatalogVariant::Isic2019,
            CatalogVariant::DermNet10,
        ] {
            let catalog = LabelCatalog::new(variant);
            let mut seen = std::collections::HashSet::new();
            for i in 0..catalog.len() {
                let name = catalog.resolve(i).name;
                assert_ne!(name, UNKNOWN_CONDITION);
                assert!(seen.insert(name), "duplicate label {name} in {variant:?}");
            }
        }
    }

    #[test]
    fn mapped_condition_returns_exact_list() {
        let catalog = LabelCatalog::new(CatalogVariant::Ham10000);
        let recs = catalog.recommendations_for("Melanoma");
        assert_eq!(
            recs,
            &[
                "Seek immediate medical attention",
                "Schedule a biopsy",
                "Monitor for changes in size or color",
            ]
        );
    }

    #[test]
    fn unmapped_condition_returns_generic_list() {
        let catalog = LabelCatalog::new(CatalogVariant::Ham10000);
        let recs = catalog.recommendations_for(UNKNOWN_CONDITION);
        assert_eq!(recs, GENERIC_RECOMMENDATIONS);
        assert_eq!(recs.len(), 4);
    }

    #[test]
    fn every_catalog_label_has_recommendations() {
        for variant in [
            CatalogVariant::Ham10000,
            CatalogVariant::Isic2019,
            CatalogVariant::DermNet10,
        ] {
            let catalog = LabelCatalog::new(variant);
            for i in 0..catalog.len() {
                let name = catalog.resolve(i).name;
                let recs = catalog.recommendations_for(name);
                assert!(
                    !recs.is_empty() && recs.len() <= 4,
                    "{name} has {} recommendations",
                    recs.len()
                );
            }
        }
    }

    #[test]
    fn variant_parses_from_config_strings() {
        assert_eq!(
            "ham10000".parse::<CatalogVariant>().unwrap(),
            CatalogVariant::Ham10000
        );
        assert_eq!(
            "ISIC".parse::<CatalogVariant>().unwrap(),
            CatalogVariant::Isic2019
        );
        assert_eq!(
            "dermnet10".parse::<CatalogVariant>().unwrap(),
            CatalogVariant::DermNet10
        );
        assert!("plants".parse::<CatalogVariant>().is_err());
    }

    #[test]
    fn default_variant_is_ham10000() {
        assert_eq!(CatalogVariant::default(), CatalogVariant::Ham10000);
    }
}
