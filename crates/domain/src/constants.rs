//! Domain constants
//!
//! Fixed texts and names shared by the sample services.

// Risk-based visit recommendations
pub const RECOMMENDED_VISIT_DESCRIPTION: &str = "Preventive vaccination (recommended by AI)";
pub const RECOMMENDED_VISIT_LEAD_WEEKS: i64 = 2;

// Care tips report layout
pub const CARE_REPORT_BANNER: &str = "General care tips from Spring PetClinic:\n";
pub const CARE_REPORT_SEPARATOR: &str = "\n\n";
pub const CARE_TIP_SEPARATOR: &str = "\n\t- ";

// Pedigree beta testing
pub const PEDIGREE_BETA_TEST_PET: &str = "Basil"; // hamster
pub const PEDIGREE_NEW_TITLE: &str = " The Second";
