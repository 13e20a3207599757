/// damage settlement - repairable damage, a write-off and a lost unit,
/// with the result serialized to json for an audit log
use rental_settlement_rs::{
    DamageDetail, DamageSeverity, DamageType, Money, PeriodUnit, RentalLine, RentalTransaction,
    ReturnDeclaration, ReturnProcessor, ReturnRequest, SettlementConfig, Uuid,
};
use chrono::{TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== damage settlement ===\n");

    let start = Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap();
    let due = Utc.with_ymd_and_hms(2024, 6, 17, 8, 0, 0).unwrap();

    // four floor sanders, one week
    let sanders = RentalLine::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        4,
        Money::from_major(350),
        1,
        PeriodUnit::Week,
        start,
        due,
        Money::from_major(1_500),
    );
    let line_id = sanders.line_id;

    let transaction = RentalTransaction::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        start,
        vec![sanders],
    );

    // one comes back fine, one needs a new drum, one is scrap, one never
    // comes back at all
    let declaration = ReturnDeclaration {
        quantity_damaged: 1,
        quantity_beyond_repair: 1,
        quantity_lost: 1,
        damage_details: vec![
            DamageDetail {
                damage_type: DamageType::Physical,
                severity: DamageSeverity::Moderate,
                quantity: 1,
                estimated_repair_cost: Money::from_major(220),
                description: "drum bearing seized".to_string(),
            },
            DamageDetail {
                damage_type: DamageType::Electrical,
                severity: DamageSeverity::BeyondRepair,
                quantity: 1,
                estimated_repair_cost: Money::ZERO,
                description: "motor burned out".to_string(),
            },
        ],
        cleaning_charge: Some(Money::from_major(80)),
        condition_notes: Some("heavy dust ingress on all units".to_string()),
        inspected_at: Some(due),
        ..ReturnDeclaration::good(line_id, 1)
    };

    let processor = ReturnProcessor::new(SettlementConfig::standard());
    let result = processor.process(&transaction, &ReturnRequest::new(vec![declaration]), due)?;

    let s = &result.settlement;
    println!("repair cost:    {}", s.repair_cost_total);
    println!("loss charge:    {}", s.loss_charge_total);
    println!("cleaning:       {}", s.cleaning_cost_total);
    println!("deposit held:   {}", s.deposit_held);
    println!("deposit refund: {}", s.deposit_refund);
    println!("net balance:    {}", s.net_balance);

    // hand the full result to the audit log as json
    println!("\naudit record:\n{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
