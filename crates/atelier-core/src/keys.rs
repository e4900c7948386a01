//! Well-known field keys shared by the curtain schemas.
//!
//! The engine reads measurements and material identity through these keys;
//! keeping them in one place stops schema authors and engine code from
//! drifting apart on spelling. The vocabulary is the workshop's French.

/// Ordered width of the window/rail coverage (cm)
pub const LARGEUR: &str = "largeur";
/// Ordered height (cm)
pub const HAUTEUR: &str = "hauteur";
/// Pair of panels (true) vs a single panel (false)
pub const PAIRE: &str = "paire";
/// Fullness multiplier applied to the finished width
pub const AMPLEUR: &str = "ampleur";
/// Crossover allowance for pairs (cm)
pub const CROISEMENT: &str = "croisement";
/// Height deduction (cm)
pub const DEDUCTION: &str = "deduction";
/// Bottom-hem allowance (cm)
pub const OURLET_BAS: &str = "ourlet_bas";
/// Side-hem allowance per panel (cm)
pub const OURLET_COTE: &str = "ourlet_cote";
/// Fabric roll width (cm)
pub const LAIZE: &str = "laize";
/// Fabric name
pub const TISSU: &str = "tissu";
/// Rail/track model
pub const RAIL: &str = "rail";
/// Mechanism length for glider counts (cm)
pub const MECANISME: &str = "mecanisme";
/// Linear meters of fabric consumed
pub const ML: &str = "ml";
/// Unit price of the material (per linear meter)
pub const PRIX_UNITAIRE: &str = "prix_unitaire";
/// Quantity multiplier for the line
pub const QUANTITE: &str = "quantite";
