//! Purchase aggregation
//!
//! Rolls the material needs of one or more documents up into a purchase
//! table: one line per distinct material (fabric at a given roll width,
//! or rail model) with summed linear meters, summed cost, and the
//! contributing source rows kept in insertion order for traceability.

use crate::geometry::CurtainSpec;
use ahash::AHashMap;
use atelier_core::{keys, Minute, Project, Row};

/// Identity of a purchasable material.
///
/// The same fabric at two roll widths is two materials: the cut plans
/// differ and suppliers price the widths separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaterialKey {
    Fabric { name: String, laize_cm: u32 },
    Rail { model: String },
}

impl MaterialKey {
    /// Display label for exports
    pub fn label(&self) -> String {
        match self {
            Self::Fabric { name, laize_cm } => format!("{name} ({laize_cm} cm)"),
            Self::Rail { model } => model.clone(),
        }
    }
}

/// One row's contribution to a purchase line
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SourceRow {
    /// Owning document (minute label or project name)
    pub document: String,
    /// Row id within the document
    pub row_id: String,
    /// Linear meters contributed
    pub linear_meters: f64,
    /// Cost contributed
    pub cost: f64,
}

/// Aggregated need for one material
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PurchaseLine {
    pub material: MaterialKey,
    /// Total linear meters (rails: total length in meters)
    pub linear_meters: f64,
    /// Total cost
    pub cost: f64,
    /// Contributing rows, in the order they were added
    pub sources: Vec<SourceRow>,
}

/// Purchase table built by scanning document rows.
///
/// Lines keep first-seen order; adding more rows for a known material
/// extends its existing line.
#[derive(Debug, Default)]
pub struct PurchaseSummary {
    lines: Vec<PurchaseLine>,
    index: AHashMap<MaterialKey, usize>,
    /// Material name → unit price, for materials whose rows carry no
    /// `prix_unitaire` (rails in particular)
    prices: AHashMap<String, f64>,
}

impl PurchaseSummary {
    /// Empty summary with no price catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty summary with a material-name → unit-price catalog
    pub fn with_prices<I, S>(prices: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            prices: prices.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ..Self::default()
        }
    }

    /// Aggregate over `(document label, rows)` groups
    pub fn aggregate<'a, I>(groups: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [Row])>,
    {
        let mut summary = Self::new();
        for (document, rows) in groups {
            summary.add_rows(document, rows);
        }
        summary
    }

    /// Aggregate the product lines of a set of minutes
    pub fn from_minutes(minutes: &[Minute]) -> Self {
        Self::aggregate(minutes.iter().map(|m| (m.label.as_str(), m.lines.as_slice())))
    }

    /// Aggregate the production lines of a set of projects
    pub fn from_projects(projects: &[Project]) -> Self {
        Self::aggregate(projects.iter().map(|p| (p.name.as_str(), p.lines.as_slice())))
    }

    /// Add every row of a document
    pub fn add_rows(&mut self, document: &str, rows: &[Row]) {
        for row in rows {
            self.add_row(document, row);
        }
    }

    /// Add one row. A row can contribute to two materials at once: its
    /// fabric and its rail.
    pub fn add_row(&mut self, document: &str, row: &Row) {
        let quantity = match row.number(keys::QUANTITE) {
            q if q > 0.0 => q,
            _ => 1.0,
        };

        let fabric = row.text(keys::TISSU);
        let fabric = fabric.trim();
        if !fabric.is_empty() {
            let key = MaterialKey::Fabric {
                name: fabric.to_string(),
                laize_cm: row.number(keys::LAIZE).round() as u32,
            };
            let ml = self.fabric_meters(row) * quantity;
            let unit_price = self.unit_price(row, fabric);
            self.push(
                key,
                SourceRow {
                    document: document.to_string(),
                    row_id: row.id.clone(),
                    linear_meters: ml,
                    cost: unit_price * ml,
                },
            );
        }

        let rail = row.text(keys::RAIL);
        let rail = rail.trim();
        if !rail.is_empty() {
            let key = MaterialKey::Rail {
                model: rail.to_string(),
            };
            let meters = self.rail_meters(row) * quantity;
            let unit_price = self.prices.get(rail).copied().unwrap_or(0.0);
            self.push(
                key,
                SourceRow {
                    document: document.to_string(),
                    row_id: row.id.clone(),
                    linear_meters: meters,
                    cost: unit_price * meters,
                },
            );
        }
    }

    /// Lines in first-seen material order
    pub fn lines(&self) -> &[PurchaseLine] {
        &self.lines
    }

    /// Look up the line for one material
    pub fn line(&self, key: &MaterialKey) -> Option<&PurchaseLine> {
        self.index.get(key).map(|&i| &self.lines[i])
    }

    /// Whether no row contributed anything
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Fabric consumption of one row: the explicit `ml` field when the
    /// operator or a formula filled it, otherwise derived from the
    /// measurements
    fn fabric_meters(&self, row: &Row) -> f64 {
        let explicit = row.number(keys::ML);
        if explicit > 0.0 {
            explicit
        } else {
            CurtainSpec::from_row(row).metrics().linear_meters
        }
    }

    /// Rail length of one row in meters, from the mechanism length with
    /// the ordered width as fallback
    fn rail_meters(&self, row: &Row) -> f64 {
        let mechanism = row.number(keys::MECANISME);
        let cm = if mechanism > 0.0 {
            mechanism
        } else {
            row.number(keys::LARGEUR)
        };
        cm / 100.0
    }

    /// Fabric unit price: the row's own field, else the catalog
    fn unit_price(&self, row: &Row, material: &str) -> f64 {
        let field = row.number(keys::PRIX_UNITAIRE);
        if field > 0.0 {
            field
        } else {
            self.prices.get(material).copied().unwrap_or(0.0)
        }
    }

    fn push(&mut self, key: MaterialKey, source: SourceRow) {
        match self.index.get(&key) {
            Some(&i) => {
                let line = &mut self.lines[i];
                line.linear_meters += source.linear_meters;
                line.cost += source.cost;
                line.sources.push(source);
            }
            None => {
                self.index.insert(key.clone(), self.lines.len());
                self.lines.push(PurchaseLine {
                    material: key,
                    linear_meters: source.linear_meters,
                    cost: source.cost,
                    sources: vec![source],
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fabric_row(id: &str, tissu: &str, laize: f64, ml: f64, prix: f64) -> Row {
        Row::new(id)
            .with(keys::TISSU, tissu)
            .with(keys::LAIZE, laize)
            .with(keys::ML, ml)
            .with(keys::PRIX_UNITAIRE, prix)
    }

    #[test]
    fn test_same_fabric_and_laize_merge() {
        let rows = vec![
            fabric_row("l1", "Lin lavé", 140.0, 6.4, 30.0),
            fabric_row("l2", "Lin lavé", 140.0, 3.6, 30.0),
        ];
        let summary = PurchaseSummary::aggregate([("M-1", rows.as_slice())]);

        assert_eq!(summary.lines().len(), 1);
        let line = &summary.lines()[0];
        assert_eq!(line.linear_meters, 10.0);
        assert_eq!(line.cost, 300.0);
        assert_eq!(line.sources.len(), 2);
        assert_eq!(line.sources[0].row_id, "l1");
        assert_eq!(line.sources[1].row_id, "l2");
    }

    #[test]
    fn test_same_fabric_different_laize_stay_apart() {
        let rows = vec![
            fabric_row("l1", "Lin lavé", 140.0, 6.0, 30.0),
            fabric_row("l2", "Lin lavé", 280.0, 6.0, 30.0),
        ];
        let summary = PurchaseSummary::aggregate([("M-1", rows.as_slice())]);
        assert_eq!(summary.lines().len(), 2);
    }

    #[test]
    fn test_lines_keep_first_seen_order() {
        let rows = vec![
            fabric_row("l1", "Velours", 140.0, 2.0, 45.0),
            fabric_row("l2", "Lin lavé", 140.0, 3.0, 30.0),
            fabric_row("l3", "Velours", 140.0, 1.0, 45.0),
        ];
        let summary = PurchaseSummary::aggregate([("M-1", rows.as_slice())]);

        let labels: Vec<_> = summary.lines().iter().map(|l| l.material.label()).collect();
        assert_eq!(labels, vec!["Velours (140 cm)", "Lin lavé (140 cm)"]);
        assert_eq!(summary.lines()[0].linear_meters, 3.0);
    }

    #[test]
    fn test_missing_ml_is_derived_from_measurements() {
        let row = Row::new("l1")
            .with(keys::TISSU, "Lin lavé")
            .with(keys::LARGEUR, 150.0)
            .with(keys::HAUTEUR, 260.0)
            .with(keys::PAIRE, true)
            .with(keys::DEDUCTION, 1.0)
            .with(keys::OURLET_BAS, 10.0)
            .with(keys::OURLET_COTE, 3.0)
            .with(keys::LAIZE, 140.0)
            .with(keys::PRIX_UNITAIRE, 30.0);

        let summary = PurchaseSummary::aggregate([("M-1", std::slice::from_ref(&row))]);
        let line = &summary.lines()[0];
        // 2 lanes of 319 cm, rounded to one decimal
        assert_eq!(line.linear_meters, 6.4);
        assert_eq!(line.cost, 6.4 * 30.0);
    }

    #[test]
    fn test_quantity_multiplier_defaults_to_one() {
        let with_qty = fabric_row("l1", "Voile", 300.0, 4.0, 12.0).with(keys::QUANTITE, 3.0);
        let without = fabric_row("l2", "Voile", 300.0, 4.0, 12.0);
        let rows = vec![with_qty, without];

        let summary = PurchaseSummary::aggregate([("M-1", rows.as_slice())]);
        let line = &summary.lines()[0];
        assert_eq!(line.linear_meters, 16.0);
        assert_eq!(line.cost, 192.0);
    }

    #[test]
    fn test_rail_rows_group_by_model() {
        let rows = vec![
            Row::new("l1").with(keys::RAIL, "KS").with(keys::MECANISME, 180.0),
            Row::new("l2").with(keys::RAIL, "KS").with(keys::MECANISME, 240.0),
            Row::new("l3").with(keys::RAIL, "DS").with(keys::LARGEUR, 150.0),
        ];
        let mut summary = PurchaseSummary::with_prices([("KS", 8.0)]);
        summary.add_rows("Chantier A", &rows);

        let ks = summary
            .line(&MaterialKey::Rail { model: "KS".into() })
            .unwrap();
        assert_eq!(ks.linear_meters, 4.2);
        assert_eq!(ks.cost, 4.2 * 8.0);

        // No mechanism length: the ordered width stands in
        let ds = summary
            .line(&MaterialKey::Rail { model: "DS".into() })
            .unwrap();
        assert_eq!(ds.linear_meters, 1.5);
        assert_eq!(ds.cost, 0.0);
    }

    #[test]
    fn test_row_with_fabric_and_rail_contributes_twice() {
        let row = fabric_row("l1", "Lin lavé", 140.0, 6.0, 30.0)
            .with(keys::RAIL, "KS")
            .with(keys::MECANISME, 200.0);

        let summary = PurchaseSummary::aggregate([("M-1", std::slice::from_ref(&row))]);
        assert_eq!(summary.lines().len(), 2);
    }

    #[test]
    fn test_from_minutes() {
        let mut m1 = Minute::new("M-1", "Villa des Lilas");
        m1.lines.push(fabric_row("l1", "Lin lavé", 140.0, 6.0, 30.0));
        let mut m2 = Minute::new("M-2", "Appartement Rive");
        m2.lines.push(fabric_row("l1", "Lin lavé", 140.0, 4.0, 30.0));

        let summary = PurchaseSummary::from_minutes(&[m1, m2]);
        let line = &summary.lines()[0];
        assert_eq!(line.linear_meters, 10.0);
        assert_eq!(line.sources[0].document, "Villa des Lilas");
        assert_eq!(line.sources[1].document, "Appartement Rive");
    }
}
