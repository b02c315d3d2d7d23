use nyaya_core::{Category, RightsRecord};

// ── Seed rights library ──────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn record(
    id: i64,
    category: Category,
    title: &str,
    description: &str,
    situation: &str,
    remedies: [&str; 4],
    timeframe: &str,
    cost: &str,
    success_rate: &str,
) -> RightsRecord {
    RightsRecord {
        id,
        category,
        title: title.into(),
        description: description.into(),
        situation: situation.into(),
        remedies: remedies.iter().map(|r| r.to_string()).collect(),
        timeframe: timeframe.into(),
        cost: cost.into(),
        success_rate: success_rate.into(),
    }
}

/// The six canned scenarios shipped with the service, in display order.
pub fn seed_records() -> Vec<RightsRecord> {
    vec![
        record(
            1,
            Category::Employment,
            "Unpaid Wages",
            "When your employer fails to pay agreed wages",
            "Your employer hasn't paid your salary for the agreed period",
            [
                "File wage claim with labor department",
                "Demand payment with interest",
                "Seek attorney fees if state law allows",
                "File civil lawsuit for damages",
            ],
            "30-90 days for wage claims",
            "Usually free for wage claims",
            "High (80-90%)",
        ),
        record(
            2,
            Category::Rental,
            "Security Deposit Not Returned",
            "Landlord fails to return security deposit within legal timeframe",
            "Your landlord didn't return your security deposit after moving out",
            [
                "Send written demand letter",
                "File complaint with housing authority",
                "Sue for double or triple damages (varies by state)",
                "Recover attorney fees",
            ],
            "30-60 days",
            "Small claims court fees ($50-200)",
            "Very High (85-95%)",
        ),
        record(
            3,
            Category::Business,
            "Goods Not Delivered",
            "Supplier fails to deliver goods as per contract",
            "A supplier didn't deliver goods you paid for",
            [
                "Demand specific performance",
                "Claim cover damages (difference in price)",
                "Seek incidental damages",
                "Cancel contract and seek refund",
            ],
            "3-12 months",
            "Medium to High",
            "High (75-85%)",
        ),
        record(
            4,
            Category::Business,
            "Service Contract Breach",
            "Service provider fails to perform as agreed",
            "A contractor didn't complete work as specified in contract",
            [
                "Demand completion of work",
                "Hire another contractor and claim difference",
                "Seek damages for delays",
                "Withhold payment for incomplete work",
            ],
            "2-8 months",
            "Medium",
            "Medium to High (70-80%)",
        ),
        record(
            5,
            Category::Loan,
            "Predatory Lending",
            "Unfair or deceptive lending practices",
            "You were charged excessive fees or interest rates",
            [
                "File complaint with consumer protection agency",
                "Seek damages under consumer protection laws",
                "Demand loan modification",
                "Sue for violations of lending laws",
            ],
            "6-18 months",
            "Medium",
            "Medium (60-70%)",
        ),
        record(
            6,
            Category::Employment,
            "Wrongful Termination",
            "Termination that violates employment contract or law",
            "You were fired in violation of your employment contract",
            [
                "File unemployment benefits claim",
                "Sue for wrongful termination",
                "Seek reinstatement if applicable",
                "Claim lost wages and benefits",
            ],
            "6-24 months",
            "Medium to High",
            "Medium (55-70%)",
        ),
    ]
}
