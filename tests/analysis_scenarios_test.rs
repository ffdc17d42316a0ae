use std::collections::HashMap;

use loan_angel::classifier::{CategoryClassifier, ClassificationService};
use loan_angel::error::Result;
use loan_angel::finance::{
    AdviceRule, AnalysisResponse, AnalyzeRequest, Category, CategoryBreakdown,
    FinancialAnalyzer, Transaction, advise,
};
use loan_angel::ml::{ForestConfig, TfIdfConfig};
use loan_angel::training::pipeline::TrainingConfig;
use loan_angel::training::{LabeledRow, TrainingPipeline};

use rust_decimal::Decimal;

/// Looks descriptions up in a fixed table; anything else is Shopping.
struct TableClassifier {
    table: HashMap<&'static str, &'static str>,
}

impl TableClassifier {
    fn new() -> Self {
        let table = HashMap::from([
            ("SALARY CREDIT - TCS", "Salary"),
            ("UPI/SWIGGY", "Food"),
            ("NETFLIX SUB", "Entertainment"),
            ("HOUSE RENT", "Rent"),
        ]);
        Self { table }
    }
}

impl CategoryClassifier for TableClassifier {
    fn classify(&self, description: &str) -> Result<Category> {
        Ok(Category::new(
            *self.table.get(description).unwrap_or(&"Shopping"),
        ))
    }

    fn name(&self) -> &str {
        "table"
    }
}

fn tx(description: &str, amount: i64) -> Transaction {
    Transaction::new(description, Decimal::from(amount))
}

#[test]
fn test_salary_food_entertainment_scenario() {
    let classifier = TableClassifier::new();
    let result = FinancialAnalyzer::new(&classifier)
        .analyze(&[
            tx("SALARY CREDIT - TCS", 100_000),
            tx("UPI/SWIGGY", 25_000),
            tx("NETFLIX SUB", 500),
        ])
        .unwrap();

    assert_eq!(result.income, Decimal::from(100_000));
    assert_eq!(result.expenses, Decimal::from(25_500));
    assert_eq!(result.surplus, Decimal::from(74_500));

    let expected = CategoryBreakdown::try_from_entries([
        (Category::new("Salary"), Decimal::from(100_000)),
        (Category::new("Food"), Decimal::from(25_000)),
        (Category::new("Entertainment"), Decimal::from(500)),
    ])
    .unwrap();
    assert_eq!(result.breakdown, expected);

    let advice = result.advise().unwrap();
    assert_eq!(advice.len(), 2);
    assert_eq!(
        advice.text(),
        "You have ₹74500.00 extra! Prepay this to your loan to save interest. \
         Warning: High spending on Food this month."
    );
}

#[test]
fn test_single_shopping_transaction_scenario() {
    let classifier = TableClassifier::new();
    let result = FinancialAnalyzer::new(&classifier)
        .analyze(&[tx("RANDOM STORE", 100)])
        .unwrap();

    assert_eq!(result.income, Decimal::ZERO);
    assert_eq!(result.expenses, Decimal::from(100));
    assert_eq!(result.surplus, Decimal::from(-100));
    assert!(result.advise().unwrap().is_empty());

    let response = AnalysisResponse::new(result.clone(), &result.advise().unwrap());
    assert_eq!(response.advice, "No specific advice at this time.");
    assert_eq!(response.total_savings, Decimal::from(-100));
}

#[test]
fn test_empty_batch_is_neutral() {
    let classifier = TableClassifier::new();
    let result = FinancialAnalyzer::new(&classifier).analyze(&[]).unwrap();
    assert_eq!(result.income, Decimal::ZERO);
    assert_eq!(result.expenses, Decimal::ZERO);
    assert_eq!(result.surplus, Decimal::ZERO);
    assert!(result.breakdown.is_empty());

    // The request boundary still rejects it.
    assert!(AnalyzeRequest::default().validate().is_err());
}

#[test]
fn test_aggregate_identities_hold() {
    let classifier = TableClassifier::new();
    let batches = vec![
        vec![tx("SALARY CREDIT - TCS", 1), tx("SALARY CREDIT - TCS", -3)],
        vec![tx("UPI/SWIGGY", 7), tx("ZARA", -12), tx("HOUSE RENT", 0)],
        vec![
            Transaction::new("UPI/SWIGGY", Decimal::new(10, 2)),
            Transaction::new("UPI/SWIGGY", Decimal::new(20, 2)),
            Transaction::new("SALARY CREDIT - TCS", Decimal::new(30, 2)),
        ],
    ];

    for batch in batches {
        let result = FinancialAnalyzer::new(&classifier).analyze(&batch).unwrap();
        let sum: Decimal = batch.iter().map(|t| t.amount).sum();
        assert_eq!(result.surplus, result.income - result.expenses);
        assert_eq!(result.breakdown.total().unwrap(), result.income + result.expenses);
        assert_eq!(result.breakdown.total().unwrap(), sum);
    }
}

#[test]
fn test_advisor_rule_combinations() {
    let food_heavy = CategoryBreakdown::try_from_entries([
        (Category::new("Food"), Decimal::from(400)),
        (Category::new("Rent"), Decimal::from(600)),
    ])
    .unwrap();
    let food_light = CategoryBreakdown::try_from_entries([
        (Category::new("Food"), Decimal::from(100)),
        (Category::new("Rent"), Decimal::from(900)),
    ])
    .unwrap();

    let both = advise(Decimal::from(20_000), &food_heavy).unwrap();
    assert!(both.fired(AdviceRule::PrepayLoan) && both.fired(AdviceRule::HighFoodSpending));

    let surplus_only = advise(Decimal::from(20_000), &food_light).unwrap();
    assert_eq!(surplus_only.len(), 1);
    assert!(surplus_only.fired(AdviceRule::PrepayLoan));

    let food_only = advise(Decimal::from(5), &food_heavy).unwrap();
    assert_eq!(food_only.len(), 1);
    assert!(food_only.fired(AdviceRule::HighFoodSpending));

    assert!(advise(Decimal::from(5), &food_light).unwrap().is_empty());

    // pure
    assert_eq!(advise(Decimal::from(20_000), &food_heavy).unwrap(), both);
}

#[test]
fn test_analysis_with_trained_service() {
    let mut rows = Vec::new();
    for _ in 0..10 {
        rows.push(LabeledRow::new("SALARY CREDIT - TCS", "Salary"));
        rows.push(LabeledRow::new("INFOSYS SALARY", "Salary"));
        rows.push(LabeledRow::new("UPI/SWIGGY", "Food"));
        rows.push(LabeledRow::new("UPI/ZOMATO", "Food"));
        rows.push(LabeledRow::new("NETFLIX SUB", "Entertainment"));
        rows.push(LabeledRow::new("SPOTIFY PREMIUM", "Entertainment"));
    }
    let forest = ForestConfig {
        n_estimators: 15,
        n_jobs: Some(1),
        ..ForestConfig::default()
    };
    let outcome = TrainingPipeline::new(TrainingConfig::default(), TfIdfConfig::default(), forest)
        .unwrap()
        .fit(&rows)
        .unwrap();
    let service = ClassificationService::from_artifact(outcome.artifact);

    let request: AnalyzeRequest = serde_json::from_str(
        r#"{"transactions": [
            {"description": "SALARY CREDIT - TCS", "amount": 100000},
            {"description": "UPI/SWIGGY", "amount": 25000},
            {"description": "NETFLIX SUB", "amount": 500}
        ]}"#,
    )
    .unwrap();
    request.validate().unwrap();

    let result = FinancialAnalyzer::new(&service)
        .analyze(&request.transactions)
        .unwrap();
    assert_eq!(result.surplus, Decimal::from(74_500));
    assert_eq!(result.breakdown.get("Food"), Some(Decimal::from(25_000)));

    let response = AnalysisResponse::new(result.clone(), &result.advise().unwrap());
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["total_savings"], 74500.0);
    assert_eq!(json["category_breakdown"]["Entertainment"], 500.0);
    assert!(json["advice"].as_str().unwrap().starts_with("You have ₹74500.00 extra!"));
}

#[test]
fn test_oversized_amounts_are_reported() {
    let request: AnalyzeRequest = serde_json::from_str(
        r#"{"transactions":[{"description":"UPI/SWIGGY","amount":5e28},{"description":"UPI/SWIGGY","amount":5e28}]}"#,
    )
    .unwrap();
    request.validate().unwrap();

    let classifier = TableClassifier::new();
    let err = FinancialAnalyzer::new(&classifier)
        .analyze(&request.transactions)
        .unwrap_err();
    assert!(err.to_string().contains("amount overflow"));
}
