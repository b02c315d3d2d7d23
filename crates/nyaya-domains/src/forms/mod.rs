use nyaya_core::FormOption;

const fn option(value: &'static str, label: &'static str) -> FormOption {
    FormOption { value, label }
}

const CONTRACT_TYPES: &[FormOption] = &[
    option("general", "General Contract"),
    option("employment", "Job Contract"),
    option("rental", "Rent or Lease"),
    option("business", "Business Agreement"),
    option("service", "Service Contract"),
    option("sales", "Sales Agreement"),
    option("other", "Other (Please Explain)"),
];

const PROBLEM_TYPES: &[FormOption] = &[
    option("employment", "Job Issues (pay, firing, workplace)"),
    option("rental", "Rent Issues (deposit, repairs, eviction)"),
    option("business", "Business Deals (suppliers, services)"),
    option("loan", "Loan or Credit Issues (payments, terms)"),
    option("consumer", "Shopping Issues (products, warranties)"),
    option("insurance", "Insurance Issues (claims, denials)"),
    option("other", "Other (Please Explain)"),
];

/// Choices offered for the breach-analysis contract type picker.
pub fn contract_types() -> &'static [FormOption] {
    CONTRACT_TYPES
}

/// Choices offered for the case-type finder problem picker.
pub fn problem_types() -> &'static [FormOption] {
    PROBLEM_TYPES
}
