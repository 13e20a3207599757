/// quick start - full on-time return of a two-line rental
use rental_settlement_rs::{
    Money, PeriodUnit, RentalLine, RentalTransaction, ReturnDeclaration, ReturnProcessor,
    ReturnRequest, SettlementConfig, Uuid,
};
use chrono::{TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== quick start ===\n");

    let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let due = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();

    // two projectors and a sound desk, three billed days each
    let projectors = RentalLine::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        2,
        Money::from_major(500),
        3,
        PeriodUnit::Day,
        start,
        due,
        Money::from_major(2_000),
    );
    let sound_desk = RentalLine::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        1,
        Money::from_major(1_200),
        3,
        PeriodUnit::Day,
        start,
        due,
        Money::from_major(5_000),
    );
    let declarations = vec![
        ReturnDeclaration::good(projectors.line_id, 2),
        ReturnDeclaration::good(sound_desk.line_id, 1),
    ];

    let transaction = RentalTransaction::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        start,
        vec![projectors, sound_desk],
    );

    // customer brings everything back on the due date
    let as_of = Utc.with_ymd_and_hms(2024, 3, 4, 16, 30, 0).unwrap();
    let processor = ReturnProcessor::new(SettlementConfig::standard());
    let result = processor.process(&transaction, &ReturnRequest::new(declarations), as_of)?;

    println!("transaction status: {:?}", result.new_status);
    for outcome in &result.line_outcomes {
        println!(
            "line {}: {:?} -> {:?}, outstanding {}",
            outcome.line_id, outcome.previous_status, outcome.new_status,
            outcome.quantity_outstanding
        );
    }

    let s = &result.settlement;
    println!("\nrental subtotal: {}", s.rental_subtotal);
    println!("deposit held:    {}", s.deposit_held);
    println!("deposit refund:  {}", s.deposit_refund);
    println!("net balance:     {}", s.net_balance);
    println!("\nemitted {} event(s)", result.events.len());

    Ok(())
}
