//! Curtain geometry
//!
//! Fixed workshop formulas mapping raw measurements to derived quantities
//! (finished width, flat width, cut height, lane and glider counts). These
//! are not user-editable expressions; the rounding rules are contractual
//! and the tests pin them.
//!
//! All lengths are centimeters unless a name says otherwise.

use atelier_core::{keys, Row};

/// Overlap factor applied to the ordered width
pub const OVERLAP_FACTOR: f64 = 1.07;

/// Cut allowance added above the finished height
pub const CUT_ALLOWANCE_CM: f64 = 50.0;

/// Fullness used when a row leaves the `ampleur` field unset
pub const DEFAULT_AMPLEUR: f64 = 2.0;

/// One panel or a facing pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelConfig {
    Single,
    Pair,
}

impl PanelConfig {
    /// Map a row's `paire` flag
    pub fn from_flag(paire: bool) -> Self {
        if paire {
            Self::Pair
        } else {
            Self::Single
        }
    }
}

/// Round to one decimal, half up.
///
/// The persisted schemas were authored against this exact rule, so e.g.
/// `80.25` rounds to `80.3`.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Finished width of one panel.
///
/// A pair splits the ordered width in two and adds the crossover
/// allowance; both configurations take the overlap factor.
pub fn finished_width(width_cm: f64, config: PanelConfig, croisement_cm: f64) -> f64 {
    match config {
        PanelConfig::Pair => round1(width_cm / 2.0 * OVERLAP_FACTOR + croisement_cm),
        PanelConfig::Single => round1(width_cm * OVERLAP_FACTOR),
    }
}

/// Flat ("à plat") width of the fabric before pleating: finished width
/// times the fullness, plus side hems (each panel has two, so a pair
/// doubles them).
pub fn flat_width(
    finished_width_cm: f64,
    ampleur: f64,
    side_hem_cm: f64,
    config: PanelConfig,
) -> f64 {
    let hems = match config {
        PanelConfig::Pair => side_hem_cm * 2.0,
        PanelConfig::Single => side_hem_cm,
    };
    round1(finished_width_cm * ampleur + hems)
}

/// Finished height: raw drop minus the deduction, plus the bottom finish
pub fn finished_height(raw_cm: f64, deduction_cm: f64, bottom_allowance_cm: f64) -> f64 {
    round1(raw_cm - deduction_cm + bottom_allowance_cm)
}

/// Cut height of one lane.
///
/// Normally the finished height plus the cut allowance. When the fabric
/// roll is wider than that, the piece is railroaded and the cut runs the
/// flat width instead.
pub fn cut_height(finished_height_cm: f64, laize_cm: f64, flat_width_cm: f64) -> f64 {
    let upright = finished_height_cm + CUT_ALLOWANCE_CM;
    if laize_cm > upright {
        flat_width_cm
    } else {
        upright
    }
}

/// Number of fabric lanes needed to cover the flat width, at least 1
pub fn lane_count(flat_width_cm: f64, laize_cm: f64) -> u32 {
    if laize_cm <= 0.0 {
        return 1;
    }
    let lanes = (flat_width_cm / laize_cm).ceil();
    if lanes < 1.0 {
        1
    } else {
        lanes as u32
    }
}

/// Glider/hook count from the mechanism length: one per 10 cm, plus 4 for
/// a pair (two leading and two trailing) or 2 for a single panel
pub fn glider_count(mechanism_cm: f64, config: PanelConfig) -> u32 {
    let base = (mechanism_cm / 10.0).round().max(0.0) as u32;
    match config {
        PanelConfig::Pair => base + 4,
        PanelConfig::Single => base + 2,
    }
}

/// Linear meters of fabric consumed by the given lanes
pub fn linear_meters(lanes: u32, cut_height_cm: f64) -> f64 {
    round1(f64::from(lanes) * cut_height_cm / 100.0)
}

/// Raw measurements of one curtain line, read from its row fields
#[derive(Debug, Clone, PartialEq)]
pub struct CurtainSpec {
    pub width_cm: f64,
    pub height_cm: f64,
    pub config: PanelConfig,
    pub ampleur: f64,
    pub croisement_cm: f64,
    pub deduction_cm: f64,
    pub bottom_hem_cm: f64,
    pub side_hem_cm: f64,
    pub laize_cm: f64,
    pub mechanism_cm: f64,
}

impl CurtainSpec {
    /// Read the well-known measurement keys from a row. Missing fields
    /// coerce to zero; an unset fullness falls back to
    /// [`DEFAULT_AMPLEUR`].
    pub fn from_row(row: &Row) -> Self {
        let ampleur = row.number(keys::AMPLEUR);
        Self {
            width_cm: row.number(keys::LARGEUR),
            height_cm: row.number(keys::HAUTEUR),
            config: PanelConfig::from_flag(row.flag(keys::PAIRE)),
            ampleur: if ampleur > 0.0 { ampleur } else { DEFAULT_AMPLEUR },
            croisement_cm: row.number(keys::CROISEMENT),
            deduction_cm: row.number(keys::DEDUCTION),
            bottom_hem_cm: row.number(keys::OURLET_BAS),
            side_hem_cm: row.number(keys::OURLET_COTE),
            laize_cm: row.number(keys::LAIZE),
            mechanism_cm: row.number(keys::MECANISME),
        }
    }

    /// Derive every computed quantity
    pub fn metrics(&self) -> CurtainMetrics {
        let finished_width = finished_width(self.width_cm, self.config, self.croisement_cm);
        let flat_width = flat_width(finished_width, self.ampleur, self.side_hem_cm, self.config);
        let finished_height = finished_height(self.height_cm, self.deduction_cm, self.bottom_hem_cm);
        let cut_height = cut_height(finished_height, self.laize_cm, flat_width);
        let lanes = lane_count(flat_width, self.laize_cm);
        let gliders = glider_count(self.mechanism_cm, self.config);
        let linear_meters = linear_meters(lanes, cut_height);

        CurtainMetrics {
            finished_width,
            flat_width,
            finished_height,
            cut_height,
            lanes,
            gliders,
            linear_meters,
        }
    }
}

/// Derived quantities of one curtain line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurtainMetrics {
    /// Finished width of one panel (cm)
    pub finished_width: f64,
    /// Fabric flat width (cm)
    pub flat_width: f64,
    /// Finished height (cm)
    pub finished_height: f64,
    /// Cut height of one lane (cm)
    pub cut_height: f64,
    /// Fabric lanes
    pub lanes: u32,
    /// Gliders/hooks
    pub gliders: u32,
    /// Fabric consumption (linear meters)
    pub linear_meters: f64,
}
