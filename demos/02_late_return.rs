/// late return - controlled time drives the engine through an overdue
/// partial return and a final late completion
use rental_settlement_rs::{
    Money, PeriodUnit, RentalLine, RentalTransaction, ReturnDeclaration, ReturnProcessor,
    ReturnRequest, SafeTimeProvider, SettlementConfig, TimeSource, Uuid,
};
use chrono::{Duration, TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== late return ===\n");

    let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let due = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();

    let scaffolding = RentalLine::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        3,
        Money::from_major(500),
        3,
        PeriodUnit::Day,
        start,
        due,
        Money::from_major(1_000),
    );
    let line_id = scaffolding.line_id;

    let mut transaction = RentalTransaction::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        start,
        vec![scaffolding],
    );

    // start the clock on the due date, then let the return slip
    let time = SafeTimeProvider::new(TimeSource::Test(due));
    let controller = time.test_control().unwrap();
    let processor = ReturnProcessor::new(SettlementConfig::standard());

    // two sections come back three days late
    controller.advance(Duration::days(3));
    println!("inspecting on {}", time.now().format("%Y-%m-%d"));

    let request = ReturnRequest::new(vec![ReturnDeclaration::good(line_id, 2)]);
    let result = processor.process_at(&transaction, &request, &time)?;
    println!(
        "status: {:?}, late fees so far: {}",
        result.new_status, result.settlement.late_fee_total
    );

    // persist the accepted outcome the way a caller would
    for outcome in &result.line_outcomes {
        let line = transaction
            .lines
            .iter_mut()
            .find(|l| l.line_id == outcome.line_id)
            .expect("outcome references a known line");
        line.quantity_returned_good = outcome.quantity_returned_good;
        line.quantity_returned_damaged = outcome.quantity_returned_damaged;
        line.quantity_returned_beyond_repair = outcome.quantity_returned_beyond_repair;
        line.quantity_returned_lost = outcome.quantity_returned_lost;
        line.status = outcome.new_status;
    }
    transaction.status = result.new_status;
    transaction.updated_at = result.updated_at;

    // the last section arrives two days after that
    controller.advance(Duration::days(2));
    println!("\nlast section arrives {}", time.now().format("%Y-%m-%d"));

    let request = ReturnRequest::new(vec![ReturnDeclaration::good(line_id, 1)]);
    let result = processor.process_at(&transaction, &request, &time)?;

    println!("status: {:?}", result.new_status);
    println!("late fee this call: {}", result.settlement.late_fee_total);
    println!("net balance:        {}", result.settlement.net_balance);
    let outcome = &result.line_outcomes[0];
    println!(
        "line closed out {} day(s) late (returned_late = {})",
        outcome.days_overdue, outcome.returned_late
    );

    Ok(())
}
