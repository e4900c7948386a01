//! Purchase aggregation over recomputed documents

use atelier::prelude::*;
use atelier::MaterialKey;

fn line(id: &str, tissu: &str, largeur: f64, hauteur: f64, prix: f64) -> Row {
    Row::new(id)
        .with(keys::TISSU, tissu)
        .with(keys::LARGEUR, largeur)
        .with(keys::HAUTEUR, hauteur)
        .with(keys::PAIRE, true)
        .with(keys::DEDUCTION, 1.0)
        .with(keys::OURLET_BAS, 10.0)
        .with(keys::OURLET_COTE, 3.0)
        .with(keys::LAIZE, 140.0)
        .with(keys::PRIX_UNITAIRE, prix)
}

#[test]
fn test_two_documents_roll_up_into_one_fabric_line() {
    let mut villa = Minute::new("M-2024-001", "Villa des Lilas");
    villa.lines.push(line("l1", "Lin lavé", 150.0, 260.0, 30.0));
    villa.lines.push(line("l2", "Lin lavé", 120.0, 260.0, 30.0));

    let mut rive = Minute::new("M-2024-002", "Appartement Rive");
    rive.lines.push(line("l1", "Lin lavé", 180.0, 240.0, 30.0));

    let summary = PurchaseSummary::from_minutes(&[villa, rive]);
    assert_eq!(summary.lines().len(), 1);

    let fabric = &summary.lines()[0];
    assert_eq!(
        fabric.material,
        MaterialKey::Fabric {
            name: "Lin lavé".into(),
            laize_cm: 140,
        }
    );
    assert_eq!(fabric.sources.len(), 3);
    assert_eq!(fabric.sources[0].document, "Villa des Lilas");
    assert_eq!(fabric.sources[2].document, "Appartement Rive");
    assert!(fabric.linear_meters > 0.0);
    assert!((fabric.cost - fabric.linear_meters * 30.0).abs() < 1e-9);
}

#[test]
fn test_recomputed_ml_feeds_the_aggregate() {
    // The quote schema writes `ml`; the aggregator then prefers that
    // field over re-deriving it
    let schema = Schema::new(vec![
        ColumnDef::new(keys::TISSU, "Tissu", ColumnType::Text),
        ColumnDef::new(keys::LAIZE, "Laize", ColumnType::Number),
        ColumnDef::new("metrage", "Métrage", ColumnType::Number),
        ColumnDef::new(keys::PRIX_UNITAIRE, "Prix unitaire", ColumnType::Number),
        ColumnDef::formula(keys::ML, "ML", "ROUND({metrage} / 100, 1)"),
    ])
    .unwrap();

    let engine = RecomputeEngine::new(&schema);
    let rows = vec![
        Row::new("l1")
            .with(keys::TISSU, "Voile")
            .with(keys::LAIZE, 300.0)
            .with("metrage", 640.0)
            .with(keys::PRIX_UNITAIRE, 12.0),
        Row::new("l2")
            .with(keys::TISSU, "Voile")
            .with(keys::LAIZE, 300.0)
            .with("metrage", 360.0)
            .with(keys::PRIX_UNITAIRE, 12.0),
    ];
    let (rows, _) = engine.recompute_rows(&rows);

    let summary = PurchaseSummary::aggregate([("M-1", rows.as_slice())]);
    let voile = &summary.lines()[0];
    assert_eq!(voile.linear_meters, 10.0);
    assert!((voile.cost - 120.0).abs() < 1e-9);
}

#[test]
fn test_rails_price_from_catalog() {
    let mut project = Project::new("P-1", "Chantier Bastide");
    project.lines.push(
        Row::new("l1")
            .with(keys::RAIL, "KS")
            .with(keys::MECANISME, 180.0),
    );
    project.lines.push(
        Row::new("l2")
            .with(keys::RAIL, "KS")
            .with(keys::MECANISME, 220.0),
    );

    let mut summary = PurchaseSummary::with_prices([("KS", 8.5)]);
    summary.add_rows(&project.name, &project.lines);

    let rail = summary
        .line(&MaterialKey::Rail { model: "KS".into() })
        .unwrap();
    assert_eq!(rail.linear_meters, 4.0);
    assert!((rail.cost - 34.0).abs() < 1e-9);
}
